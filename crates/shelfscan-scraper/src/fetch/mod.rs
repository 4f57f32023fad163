//! Page-fetch capability.
//!
//! A [`PageFetcher`] hands each collection worker its own [`PageSession`];
//! the session is dropped when the worker finishes, fails or is abandoned on
//! timeout. A session answers a [`PageRequest`] with the text or attribute
//! fragments its selectors matched.

mod http;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::HttpPageFetcher;

/// Ordered CSS selector candidates for one field, reading an attribute
/// instead of text when set.
///
/// Candidates are tried in order and the first one with a non-empty match
/// supplies the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    pub candidates: Vec<String>,
    pub attribute: Option<String>,
}

impl FieldSelector {
    #[must_use]
    pub fn text(candidates: &[&str]) -> Self {
        Self {
            candidates: candidates.iter().map(|c| (*c).to_string()).collect(),
            attribute: None,
        }
    }

    #[must_use]
    pub fn attr(candidates: &[&str], attribute: &str) -> Self {
        Self {
            candidates: candidates.iter().map(|c| (*c).to_string()).collect(),
            attribute: Some(attribute.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: String,
    /// Container for one product. Selectors are evaluated inside each
    /// container; when `None` the whole document is a single item.
    pub item_selector: Option<String>,
    pub fields: Vec<FieldSelector>,
    pub navigation_timeout: Duration,
}

/// Matches for one item container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageItem {
    /// `fragments[i]` holds every non-empty match of the first matching
    /// candidate of `fields[i]`, in document order.
    pub fragments: Vec<Vec<String>>,
    /// Whitespace-collapsed text content of the container.
    pub text: String,
}

impl PageItem {
    /// First match of field `index`, if any.
    #[must_use]
    pub fn first(&self, index: usize) -> Option<&str> {
        self.fragments
            .get(index)
            .and_then(|matches| matches.first())
            .map(String::as_str)
    }

    /// All matches of field `index`.
    #[must_use]
    pub fn all(&self, index: usize) -> &[String] {
        self.fragments.get(index).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub items: Vec<PageItem>,
}

impl FetchedPage {
    /// Item texts joined one per line, suitable as raw input for AI extraction.
    #[must_use]
    pub fn raw_text(&self) -> String {
        self.items
            .iter()
            .map(|item| item.text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Source of per-worker page sessions.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`FetchError`] if the session's resources cannot be acquired.
    async fn open_session(&self) -> Result<Box<dyn PageSession>, FetchError>;
}

/// A worker-owned fetch resource. Released on drop.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// # Errors
    ///
    /// Returns [`FetchError`] on navigation timeout, transport failure,
    /// non-success status or a bot challenge page. Zero matches is not an error.
    async fn fetch(&self, request: &PageRequest) -> Result<FetchedPage, FetchError>;
}
