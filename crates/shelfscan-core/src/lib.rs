//! Shared domain model and pure pipeline logic for shelfscan.
//!
//! Everything in this crate is synchronous: listing/job types, the source
//! table, price/unit normalization, name matching, and configuration loading.

pub mod app_config;
pub mod category;
pub mod config;
pub mod job;
pub mod listing;
pub mod matching;
pub mod normalize;
pub mod source;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use job::{JobStatus, ScrapeJob};
pub use listing::{Listing, ListingOrigin};
pub use source::{load_source_profiles, Source, SourceProfile, SourceProfiles};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("listing price must not be negative, got {0}")]
    NegativePrice(rust_decimal::Decimal),

    #[error("unknown source: {0}")]
    UnknownSource(String),

    #[error("invalid job transition for {job}: {from} -> {to}")]
    InvalidTransition {
        job: Source,
        from: JobStatus,
        to: JobStatus,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("source profile validation failed: {0}")]
    Validation(String),
}
