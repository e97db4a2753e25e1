use std::sync::Arc;

use shared::domain::Photo;
use tracing::{info, warn};
use url::Url;

use crate::catalog::CatalogApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub photo_id: String,
    /// Full-resolution reference to open. Always present.
    pub asset_url: String,
    pub tracked: bool,
}

/// Track-then-open download protocol.
///
/// The tracking call only feeds the catalog's usage accounting. Its failure is logged and
/// the full-resolution reference is still handed back, so a download is never blocked by it.
pub struct DownloadCoordinator<A: CatalogApi> {
    api: Arc<A>,
}

impl<A: CatalogApi> DownloadCoordinator<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn download(&self, photo: &Photo) -> DownloadOutcome {
        match self.api.track_download(&photo.download_location).await {
            Ok(()) => {
                info!(photo_id = %photo.id, "download tracked");
                DownloadOutcome {
                    photo_id: photo.id.clone(),
                    asset_url: force_download_url(&photo.full_url),
                    tracked: true,
                }
            }
            Err(err) => {
                warn!(
                    photo_id = %photo.id,
                    code = ?err.code(),
                    "download tracking failed, opening asset directly: {err}"
                );
                DownloadOutcome {
                    photo_id: photo.id.clone(),
                    asset_url: photo.full_url.clone(),
                    tracked: false,
                }
            }
        }
    }
}

impl<A: CatalogApi> Clone for DownloadCoordinator<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

/// Appends `force=true`, which asks the image CDN to serve the asset as an attachment.
fn force_download_url(full_url: &str) -> String {
    match Url::parse(full_url) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("force", "true");
            url.to_string()
        }
        Err(_) => full_url.to_string(),
    }
}
