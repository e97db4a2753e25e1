mod command;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{load_settings, load_settings_from, CatalogClient, SearchSession};
use shared::domain::SearchQuery;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, HELP};

#[derive(Parser, Debug)]
#[command(about = "Search a royalty-free photo catalog and download results")]
struct Args {
    /// Config file; defaults to ./image_finder.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    access_key: Option<String>,
    #[arg(long)]
    api_base_url: Option<String>,
    /// Query searched at startup.
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(v) = args.access_key {
        settings.access_key = v;
    }
    if let Some(v) = args.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = args.query {
        settings.default_query = v;
    }

    let default_query =
        SearchQuery::new(settings.default_query.clone()).context("default query must not be empty")?;
    if !settings.has_access_key() {
        tracing::warn!("no access key configured; searches will fail until one is provided");
    }
    tracing::info!(api_base_url = %settings.api_base_url, "starting image finder");
    let client = CatalogClient::from_settings(&settings)?;
    let mut session = SearchSession::new(Arc::new(client), default_query);

    println!("{HELP}");
    session.start();
    redraw(&session);

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        tokio::select! {
            settled = session.settle_next(), if session.has_in_flight() => {
                if settled == Some(true) {
                    redraw(&session);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(&mut session, command),
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    Ok(())
}

fn handle(session: &mut SearchSession<CatalogClient>, command: Command) {
    match command {
        Command::Search(text) => {
            if !session.submit_search(text) && session.controller().error_message().is_none() {
                println!("enter something to search for");
            }
            redraw(session);
        }
        Command::Next => {
            if !session.next_page() {
                println!("no next page");
            }
            redraw(session);
        }
        Command::Previous => {
            if !session.previous_page() {
                println!("no previous page");
            }
            redraw(session);
        }
        Command::Page(page) => {
            session.go_to_page(page);
            redraw(session);
        }
        Command::Download(index) => {
            let Some(photo) = session.controller().view().photos.get(index - 1).cloned() else {
                println!("no result number {index} on screen");
                return;
            };
            println!("downloading {}...", photo.id);
            let downloader = session.downloader();
            tokio::spawn(async move {
                let outcome = downloader.download(&photo).await;
                println!("{}", render::render_download(&outcome));
            });
        }
        Command::Show => redraw(session),
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn redraw(session: &SearchSession<CatalogClient>) {
    print!("{}", render::render_view(&session.controller().view()));
}
