//! Comparison, ranking and insight generation over collected listings.
//!
//! Everything here is synchronous and stateless: results are recomputed from
//! the listing set on every call and never mutate it.

pub mod analyzer;
pub mod insights;
pub mod ranking;
pub mod stats;

use thiserror::Error;

pub use analyzer::{Analyzer, ComparisonResult};
pub use ranking::{Recommendation, SortOrder};
pub use stats::{CategoryStats, SourceStats};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown sort order \"{0}\"")]
    UnknownSortOrder(String),
}
