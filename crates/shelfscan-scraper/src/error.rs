use std::time::Duration;

use thiserror::Error;

/// Failure of a single page fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("navigation timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("bot challenge served by {url}")]
    Blocked { url: String },

    #[error("invalid URL \"{0}\"")]
    InvalidUrl(String),

    #[error("invalid selector \"{0}\"")]
    InvalidSelector(String),
}

impl FetchError {
    /// Whether retrying the same request might succeed.
    ///
    /// Timeouts, network failures, `429` and `5xx` are transient. Other
    /// statuses, bot challenges and malformed requests are not: the source is
    /// treated as unavailable for this run.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::Connect(_) | FetchError::Request(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Blocked { .. }
            | FetchError::InvalidUrl(_)
            | FetchError::InvalidSelector(_) => false,
        }
    }
}

/// Request-level rejection from the collector. Nothing is attempted.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("unknown source: {0}")]
    UnknownSource(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog file {path} is not valid JSON: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize catalog: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publisher for topic {topic} is closed")]
    Closed { topic: String },
}
