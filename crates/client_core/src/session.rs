//! Async driver around [`SearchController`].
//!
//! Searches run as spawned tasks and report back over a channel; completions are applied
//! one at a time on the owner's side, so the controller is never touched concurrently.

use std::sync::Arc;

use shared::{
    domain::{Photo, SearchPage, SearchQuery},
    error::ApiError,
};
use tokio::sync::mpsc;

use crate::{
    catalog::CatalogApi,
    controller::{SearchController, SearchTicket},
    download::{DownloadCoordinator, DownloadOutcome},
};

struct SearchCompletion {
    ticket: SearchTicket,
    outcome: Result<SearchPage, ApiError>,
}

pub struct SearchSession<A: CatalogApi + 'static> {
    api: Arc<A>,
    controller: SearchController,
    downloads: DownloadCoordinator<A>,
    completions_tx: mpsc::UnboundedSender<SearchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<SearchCompletion>,
    in_flight: usize,
}

impl<A: CatalogApi + 'static> SearchSession<A> {
    pub fn new(api: Arc<A>, default_query: SearchQuery) -> Self {
        let controller = SearchController::new(default_query, api.has_credential());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            downloads: DownloadCoordinator::new(Arc::clone(&api)),
            api,
            controller,
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight > 0
    }

    /// Runs the startup search. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> bool {
        let ticket = self.controller.start();
        self.dispatch(ticket)
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.controller.set_input(text);
    }

    pub fn submit_search(&mut self, text: impl Into<String>) -> bool {
        let ticket = self.controller.submit_search(text);
        self.dispatch(ticket)
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        let ticket = self.controller.go_to_page(page);
        self.dispatch(ticket)
    }

    pub fn next_page(&mut self) -> bool {
        let ticket = self.controller.next_page();
        self.dispatch(ticket)
    }

    pub fn previous_page(&mut self) -> bool {
        let ticket = self.controller.previous_page();
        self.dispatch(ticket)
    }

    pub async fn download(&self, photo: &Photo) -> DownloadOutcome {
        self.downloads.download(photo).await
    }

    /// Detached handle for running a download off the event loop.
    pub fn downloader(&self) -> DownloadCoordinator<A> {
        self.downloads.clone()
    }

    /// Waits for the next search to settle and applies it.
    ///
    /// Returns `None` when nothing is in flight, otherwise whether the completion was
    /// applied (`false` means it was stale and discarded). Cancel safe.
    pub async fn settle_next(&mut self) -> Option<bool> {
        if self.in_flight == 0 {
            return None;
        }

        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.controller.apply(completion.ticket, completion.outcome))
    }

    /// Settles completions until the latest episode has resolved.
    pub async fn wait_until_settled(&mut self) {
        while self.controller.is_loading() {
            if self.settle_next().await.is_none() {
                break;
            }
        }
    }

    fn dispatch(&mut self, ticket: Option<SearchTicket>) -> bool {
        let Some(ticket) = ticket else {
            return false;
        };

        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = api.search(ticket.query(), ticket.page()).await;
            let _ = tx.send(SearchCompletion { ticket, outcome });
        });
        true
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
