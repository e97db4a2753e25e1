//! Wire bodies of the remote photo catalog.

use serde::{Deserialize, Serialize};

use crate::domain::{Photo, SearchPage, RESULTS_PER_PAGE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPhotosResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    pub total_pages: u32,
    pub results: Vec<RemotePhoto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePhoto {
    pub id: String,
    pub urls: RemotePhotoUrls,
    #[serde(default)]
    pub alt_description: Option<String>,
    pub links: RemotePhotoLinks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePhotoUrls {
    pub small: String,
    pub full: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePhotoLinks {
    pub download_location: String,
}

/// Error body returned with non-2xx statuses, e.g. `{"errors": ["OAuth error"]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}

impl From<RemotePhoto> for Photo {
    fn from(value: RemotePhoto) -> Self {
        Self {
            id: value.id,
            display_url: value.urls.small,
            full_url: value.urls.full,
            alt_description: value.alt_description,
            download_location: value.links.download_location,
        }
    }
}

impl SearchPhotosResponse {
    pub fn into_search_page(self) -> SearchPage {
        SearchPage {
            results: self
                .results
                .into_iter()
                .take(RESULTS_PER_PAGE as usize)
                .map(Photo::from)
                .collect(),
            total_pages: self.total_pages.max(1),
        }
    }
}
