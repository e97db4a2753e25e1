//! Search, pagination and download orchestration against a remote photo catalog.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod download;
pub mod session;

pub use catalog::{CatalogApi, CatalogClient};
pub use config::{load_settings, load_settings_from, Settings};
pub use controller::{Pagination, RequestState, SearchController, SearchTicket, SearchView};
pub use download::{DownloadCoordinator, DownloadOutcome};
pub use session::SearchSession;
