//! AI-assisted extraction for shelfscan.
//!
//! A [`TextCompletion`] capability turns raw page text into structured
//! listings and answers name/brand/similarity questions. Every operation on
//! [`AiExtractor`] has a deterministic fallback, so a missing or misbehaving
//! model never fails the pipeline.

pub mod completion;
pub mod error;
pub mod extractor;
pub mod prompts;

mod parse;
mod pattern;

pub use completion::{OpenAiCompatibleClient, Prompt, TextCompletion};
pub use error::AiError;
pub use extractor::{AiExtractor, UNKNOWN_BRAND};
