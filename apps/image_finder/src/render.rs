//! Plain-text rendering of the controller view.

use std::fmt::Write as _;

use client_core::{DownloadOutcome, SearchView};

pub fn render_view(view: &SearchView<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "search: {}", view.input);

    if view.loading {
        let _ = writeln!(out, "Loading images...");
        return out;
    }

    if let Some(message) = &view.error_message {
        let _ = writeln!(out, "Error! {message}");
    }

    for (index, photo) in view.photos.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}  {}",
            index + 1,
            photo.alt_text(),
            photo.display_url
        );
    }

    if let Some(pagination) = view.pagination {
        let previous = if pagination.can_go_previous { "[prev]" } else { " prev " };
        let next = if pagination.can_go_next { "[next]" } else { " next " };
        let _ = writeln!(out, "{previous}  {}  {next}", pagination.label());
    }

    out
}

pub fn render_download(outcome: &DownloadOutcome) -> String {
    format!("download {}: {}", outcome.photo_id, outcome.asset_url)
}
