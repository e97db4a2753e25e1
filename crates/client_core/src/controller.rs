//! Request lifecycle controller: query/page state, episode tokens, and the view it exposes.
//!
//! Every search the controller issues is an episode tagged with a generation token.
//! Only the completion carrying the latest token is applied; anything older is dropped,
//! so responses that arrive out of order never overwrite newer state.

use shared::{
    domain::{PageNumber, Photo, SearchPage, SearchQuery},
    error::ApiError,
};
use tracing::{debug, warn};

pub const NO_RESULTS_MESSAGE: &str = "No images found for your search. Try a different query!";
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Please add your Unsplash Access Key to the configuration (access_key).";
pub const UNAUTHORIZED_MESSAGE: &str =
    "Unauthorized: Invalid Unsplash Access Key. Please check your key.";
pub const RATE_LIMITED_MESSAGE: &str =
    "API Rate Limit Exceeded or Invalid Access Key. Please wait a bit or check your key.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Loading,
    Success,
    Failed(ApiError),
}

/// Identifies one issued search. Only the controller mints tickets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: SearchQuery,
    page: PageNumber,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total: u32,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

impl Pagination {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.total)
    }
}

/// What the presentation layer may render right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView<'a> {
    pub input: &'a str,
    pub loading: bool,
    pub error_message: Option<String>,
    pub photos: &'a [Photo],
    pub pagination: Option<Pagination>,
}

#[derive(Debug)]
pub struct SearchController {
    input: String,
    active_query: SearchQuery,
    page: PageNumber,
    /// `None` until the active query has a successful response.
    total_pages: Option<u32>,
    results: Vec<Photo>,
    state: RequestState,
    generation: u64,
    credential_present: bool,
}

impl SearchController {
    pub fn new(default_query: SearchQuery, credential_present: bool) -> Self {
        Self {
            input: default_query.as_str().to_string(),
            active_query: default_query,
            page: PageNumber::FIRST,
            total_pages: None,
            results: Vec::new(),
            state: RequestState::Idle,
            generation: 0,
            credential_present,
        }
    }

    /// Startup episode: searches the default query without waiting for user input.
    pub fn start(&mut self) -> Option<SearchTicket> {
        self.page = PageNumber::FIRST;
        self.total_pages = None;
        self.issue()
    }

    /// Keystroke-level update of the search box. Never triggers a fetch.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Submits `text` as a new search on page 1. Blank text is ignored.
    pub fn submit_search(&mut self, text: impl Into<String>) -> Option<SearchTicket> {
        self.set_input(text);
        self.submit_input()
    }

    /// Submits whatever is currently in the search box.
    pub fn submit_input(&mut self) -> Option<SearchTicket> {
        let Ok(query) = SearchQuery::new(self.input.clone()) else {
            debug!("ignoring blank search submission");
            return None;
        };

        self.active_query = query;
        self.page = PageNumber::FIRST;
        self.total_pages = None;
        self.issue()
    }

    /// Fetches `page` of the active query, clamped to `[1, total_pages]`.
    ///
    /// Allowed while loading: the new episode supersedes the in-flight one. While the
    /// active query's page count is still unknown, only page 1 is reachable.
    pub fn go_to_page(&mut self, page: u32) -> Option<SearchTicket> {
        let target = PageNumber::clamped(page, self.total_pages.unwrap_or(1));
        let settled_or_pending =
            matches!(self.state, RequestState::Loading | RequestState::Success);
        if target == self.page && settled_or_pending {
            return None;
        }

        self.page = target;
        self.issue()
    }

    pub fn next_page(&mut self) -> Option<SearchTicket> {
        if !self.can_go_next() {
            return None;
        }
        self.go_to_page(self.page.get() + 1)
    }

    pub fn previous_page(&mut self) -> Option<SearchTicket> {
        if !self.can_go_previous() {
            return None;
        }
        self.go_to_page(self.page.get() - 1)
    }

    pub fn can_go_next(&self) -> bool {
        !self.is_loading() && self.total_pages.is_some_and(|total| self.page.get() < total)
    }

    pub fn can_go_previous(&self) -> bool {
        !self.is_loading() && self.page > PageNumber::FIRST
    }

    /// Applies a settled search. Returns `false` when the ticket is stale and was discarded.
    pub fn apply(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<SearchPage, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                latest = self.generation,
                page = ticket.page.get(),
                "discarding stale search completion"
            );
            return false;
        }

        match outcome {
            Ok(page) => {
                debug!(
                    generation = ticket.generation,
                    results = page.results.len(),
                    total_pages = page.total_pages,
                    "search succeeded"
                );
                let total = page.total_pages.max(1);
                self.results = page.results;
                self.total_pages = Some(total);
                self.page = PageNumber::clamped(self.page.get(), total);
                self.state = RequestState::Success;
            }
            Err(err) => {
                warn!(generation = ticket.generation, code = ?err.code(), "search failed: {err}");
                self.state = RequestState::Failed(err);
            }
        }
        true
    }

    fn issue(&mut self) -> Option<SearchTicket> {
        if !self.credential_present {
            warn!("search requested without an access key");
            self.state = RequestState::Failed(ApiError::MissingCredential);
            return None;
        }

        self.generation += 1;
        self.state = RequestState::Loading;
        debug!(
            generation = self.generation,
            query = %self.active_query,
            page = self.page.get(),
            "issuing search"
        );

        Some(SearchTicket {
            generation: self.generation,
            query: self.active_query.clone(),
            page: self.page,
        })
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == RequestState::Loading
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn active_query(&self) -> &SearchQuery {
        &self.active_query
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Latest result set, including stale results retained after a failure.
    pub fn results(&self) -> &[Photo] {
        &self.results
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Banner text; derived from the state so it clears whenever a new episode starts.
    pub fn error_message(&self) -> Option<String> {
        match &self.state {
            RequestState::Failed(err) => Some(user_message(err)),
            RequestState::Success if self.results.is_empty() => Some(NO_RESULTS_MESSAGE.to_string()),
            _ => None,
        }
    }

    pub fn view(&self) -> SearchView<'_> {
        let loading = self.is_loading();
        let photos: &[Photo] = match self.state {
            RequestState::Success => &self.results,
            _ => &[],
        };
        let pagination = self
            .total_pages
            .filter(|&total| !loading && total > 1)
            .map(|total| Pagination {
                current: self.page.get(),
                total,
                can_go_previous: self.can_go_previous(),
                can_go_next: self.can_go_next(),
            });

        SearchView {
            input: &self.input,
            loading,
            error_message: self.error_message(),
            photos,
            pagination,
        }
    }
}

pub fn user_message(err: &ApiError) -> String {
    match err {
        ApiError::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
        ApiError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
        ApiError::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
        ApiError::Malformed(_) | ApiError::Network(_) | ApiError::Unknown { .. } => {
            format!("Failed to load images: {err}. Please try again.")
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
