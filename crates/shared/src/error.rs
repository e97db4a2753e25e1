use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingCredential,
    Unauthorized,
    RateLimited,
    Malformed,
    Network,
    Unknown,
}

/// Failure outcome of a catalog call. Zero results is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("no access key configured")]
    MissingCredential,
    #[error("access key rejected by the catalog")]
    Unauthorized,
    #[error("rate limit exceeded or access key forbidden")]
    RateLimited,
    #[error("malformed catalog response: {0}")]
    Malformed(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("{message}")]
    Unknown {
        status: Option<u16>,
        message: String,
    },
}

impl ApiError {
    pub fn unknown(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Unknown {
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingCredential => ErrorCode::MissingCredential,
            Self::Unauthorized => ErrorCode::Unauthorized,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::Malformed(_) => ErrorCode::Malformed,
            Self::Network(_) => ErrorCode::Network,
            Self::Unknown { .. } => ErrorCode::Unknown,
        }
    }
}
