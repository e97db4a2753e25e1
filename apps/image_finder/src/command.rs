//! User commands typed at the prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Next,
    Previous,
    Page(u32),
    /// 1-based index into the visible grid.
    Download(usize),
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "search" | "s" => Ok(Self::Search(rest.to_string())),
            "next" | "n" => Ok(Self::Next),
            "prev" | "previous" | "p" => Ok(Self::Previous),
            "page" => rest
                .parse::<u32>()
                .map(Self::Page)
                .map_err(|_| format!("expected a page number, got '{rest}'")),
            "download" | "d" => match rest.parse::<usize>() {
                Ok(index) if index >= 1 => Ok(Self::Download(index)),
                _ => Err(format!("expected a result number, got '{rest}'")),
            },
            "show" | "" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (type 'help')")),
        }
    }
}

pub const HELP: &str = "\
commands:
  search <text>    new search, starts at page 1
  next | prev      move between result pages
  page <n>         jump to page n
  download <n>     download result n
  show             redraw the current results
  quit";
