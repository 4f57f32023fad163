//! Plain-HTTP page fetcher with CSS selection via the `scraper` crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use super::{FetchedPage, FieldSelector, PageFetcher, PageItem, PageRequest, PageSession};
use crate::error::FetchError;

/// Longest item text kept for AI extraction input.
const MAX_ITEM_TEXT_CHARS: usize = 4_000;

/// Fetches pages over HTTP. Each session gets its own connection pool.
pub struct HttpPageFetcher {
    user_agent: String,
}

impl HttpPageFetcher {
    #[must_use]
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn open_session(&self) -> Result<Box<dyn PageSession>, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Box::new(HttpPageSession {
            client,
            fetched: AtomicUsize::new(0),
        }))
    }
}

struct HttpPageSession {
    client: reqwest::Client,
    fetched: AtomicUsize,
}

impl Drop for HttpPageSession {
    fn drop(&mut self) {
        tracing::debug!(
            pages = self.fetched.load(Ordering::Relaxed),
            "page session released"
        );
    }
}

#[async_trait]
impl PageSession for HttpPageSession {
    async fn fetch(&self, request: &PageRequest) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(&request.url)
            .timeout(request.navigation_timeout)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(|e| map_request_error(&e, request))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: request.url.clone(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_request_error(&e, request))?;
        if looks_like_bot_challenge(&body) {
            return Err(FetchError::Blocked {
                url: request.url.clone(),
            });
        }

        self.fetched.fetch_add(1, Ordering::Relaxed);
        parse_page(request, &body)
    }
}

fn map_request_error(err: &reqwest::Error, request: &PageRequest) -> FetchError {
    if err.is_builder() {
        FetchError::InvalidUrl(request.url.clone())
    } else if err.is_timeout() {
        FetchError::Timeout(request.navigation_timeout)
    } else if err.is_connect() {
        FetchError::Connect(err.to_string())
    } else {
        FetchError::Request(err.to_string())
    }
}

/// Evaluates the request's selectors against an HTML body.
///
/// An unparseable field candidate is skipped; an unparseable item selector
/// fails the whole page.
pub(crate) fn parse_page(request: &PageRequest, body: &str) -> Result<FetchedPage, FetchError> {
    let document = Html::parse_document(body);

    let fields: Vec<CompiledField<'_>> = request.fields.iter().map(CompiledField::new).collect();

    let items = match &request.item_selector {
        Some(item_selector) => {
            let container = Selector::parse(item_selector)
                .map_err(|_| FetchError::InvalidSelector(item_selector.clone()))?;
            document
                .select(&container)
                .map(|element| collect_item(element, &fields))
                .collect()
        }
        None => vec![collect_item(document.root_element(), &fields)],
    };

    Ok(FetchedPage {
        url: request.url.clone(),
        items,
    })
}

struct CompiledField<'a> {
    candidates: Vec<Selector>,
    attribute: Option<&'a str>,
}

impl<'a> CompiledField<'a> {
    fn new(field: &'a FieldSelector) -> Self {
        let candidates = field
            .candidates
            .iter()
            .filter_map(|candidate| match Selector::parse(candidate) {
                Ok(selector) => Some(selector),
                Err(_) => {
                    tracing::warn!(selector = %candidate, "skipping invalid field selector");
                    None
                }
            })
            .collect();
        Self {
            candidates,
            attribute: field.attribute.as_deref(),
        }
    }

    /// Matches of the first candidate that yields any non-empty fragment.
    fn fragments(&self, element: ElementRef<'_>) -> Vec<String> {
        for candidate in &self.candidates {
            let matched: Vec<String> = element
                .select(candidate)
                .filter_map(|matched| match self.attribute {
                    Some(attribute) => matched.value().attr(attribute).map(|v| v.trim().to_string()),
                    None => Some(collapse_whitespace(matched.text())),
                })
                .filter(|fragment| !fragment.is_empty())
                .collect();
            if !matched.is_empty() {
                return matched;
            }
        }
        Vec::new()
    }
}

fn collect_item(element: ElementRef<'_>, fields: &[CompiledField<'_>]) -> PageItem {
    let fragments = fields.iter().map(|field| field.fragments(element)).collect();

    let text: String = collapse_whitespace(element.text())
        .chars()
        .take(MAX_ITEM_TEXT_CHARS)
        .collect();

    PageItem { fragments, text }
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    lowered.contains("attention required! | cloudflare")
        || lowered.contains("/cdn-cgi/challenge-platform/")
        || lowered.contains("<title>just a moment...</title>")
        || lowered.contains("cf-chl-")
        || lowered.contains("captcha-delivery.com")
        || lowered.contains("pardon our interruption")
}
