use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, StatusCode};
use shared::{
    domain::{PageNumber, SearchPage, SearchQuery, RESULTS_PER_PAGE},
    error::ApiError,
    protocol::{ErrorBody, SearchPhotosResponse},
};
use tracing::{debug, warn};

use crate::config::Settings;

const GENERIC_FAILURE_DETAIL: &str = "Failed to fetch images";

/// Remote photo catalog. Implementations never retry and always return a typed outcome.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    fn has_credential(&self) -> bool;

    async fn search(&self, query: &SearchQuery, page: PageNumber) -> Result<SearchPage, ApiError>;

    /// Registers a download with the catalog's usage accounting. The body is ignored.
    async fn track_download(&self, download_location: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    api_base_url: String,
    access_key: String,
}

impl CatalogClient {
    pub fn new(api_base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self::with_http(Client::new(), api_base_url, access_key)
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self::with_http(
            http,
            settings.api_base_url.clone(),
            settings.access_key.clone(),
        ))
    }

    fn with_http(
        http: Client,
        api_base_url: impl Into<String>,
        access_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            access_key: access_key.into().trim().to_string(),
        }
    }

    fn authorization(&self) -> String {
        format!("Client-ID {}", self.access_key)
    }

    async fn get_checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, ApiError> {
        let res = request
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = res.status();
        let body = res.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let err = classify_status(status, &body);
            warn!(status = status.as_u16(), code = ?err.code(), "catalog request failed");
            return Err(err);
        }

        Ok(body)
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    fn has_credential(&self) -> bool {
        !self.access_key.is_empty()
    }

    async fn search(&self, query: &SearchQuery, page: PageNumber) -> Result<SearchPage, ApiError> {
        if !self.has_credential() {
            return Err(ApiError::MissingCredential);
        }

        let url = format!("{}/search/photos", self.api_base_url);
        debug!(page = page.get(), query = %query, "searching catalog");

        let request = self.http.get(&url).query(&[
            ("page", page.get().to_string()),
            ("per_page", RESULTS_PER_PAGE.to_string()),
            ("query", query.as_str().to_string()),
        ]);
        let body = self.get_checked(request).await?;

        let parsed: SearchPhotosResponse =
            serde_json::from_str(&body).map_err(|err| ApiError::Malformed(err.to_string()))?;
        Ok(parsed.into_search_page())
    }

    async fn track_download(&self, download_location: &str) -> Result<(), ApiError> {
        if !self.has_credential() {
            return Err(ApiError::MissingCredential);
        }

        debug!(download_location, "tracking download");
        self.get_checked(self.http.get(download_location))
            .await
            .map(|_| ())
    }
}

pub(crate) fn classify_status(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
        _ => {
            let detail = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .filter(|parsed| !parsed.errors.is_empty())
                .map(|parsed| parsed.errors.join(", "))
                .unwrap_or_else(|| GENERIC_FAILURE_DETAIL.to_string());
            ApiError::unknown(Some(status.as_u16()), detail)
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        ApiError::unknown(None, err.to_string())
    } else if err.is_decode() {
        ApiError::Malformed(err.to_string())
    } else {
        ApiError::Network(err.to_string())
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
