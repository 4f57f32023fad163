use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion endpoint {url} returned status {status}")]
    Status { status: u16, url: String },

    #[error("completion response had no content")]
    EmptyResponse,
}
