use thiserror::Error;

use crate::parser::ParseError;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Upstream format error: {0}")]
    UpstreamFormat(#[from] ParseError),

    #[error("Fetch timed out after {0} ms")]
    Timeout(u64),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown software: {0}")]
    UnknownSoftware(String),

    #[error("Invalid version format: {0:?}")]
    InvalidVersionFormat(String),

    #[error("Version {version} of {software} lies outside the known timeline")]
    VersionOutOfRange { software: String, version: String },

    #[error("No usable default dataset: {0}")]
    MissingDefaultData(String),

    #[error("Timeline lock poisoned")]
    LockPoisoned,

    #[error("Failed to build HTTP client: {0}")]
    Http(String),
}
