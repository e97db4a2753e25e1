use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed page size requested from the catalog.
pub const RESULTS_PER_PAGE: u32 = 25;

/// Shown in place of a missing or empty `alt_description`.
pub const DEFAULT_ALT_TEXT: &str = "Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search query must not be empty")]
pub struct EmptyQuery;

/// Non-empty search text, sent verbatim (URL-escaped by the transport).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Result<Self, EmptyQuery> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EmptyQuery);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SearchQuery {
    type Error = EmptyQuery;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SearchQuery> for String {
    fn from(value: SearchQuery) -> Self {
        value.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 1-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageNumber(u32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(1);

    pub fn new(page: u32) -> Option<Self> {
        (page >= 1).then_some(Self(page))
    }

    /// Clamps `page` into `[1, total_pages]`; a zero total counts as one page.
    pub fn clamped(page: u32, total_pages: u32) -> Self {
        Self(page.clamp(1, total_pages.max(1)))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Unique within one result page only.
    pub id: String,
    pub display_url: String,
    pub full_url: String,
    pub alt_description: Option<String>,
    /// Opaque tracking callback that registers a download with the catalog.
    pub download_location: String,
}

impl Photo {
    pub fn alt_text(&self) -> &str {
        self.alt_description
            .as_deref()
            .filter(|alt| !alt.trim().is_empty())
            .unwrap_or(DEFAULT_ALT_TEXT)
    }
}

/// One page of search results. `total_pages` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPage {
    pub results: Vec<Photo>,
    pub total_pages: u32,
}
