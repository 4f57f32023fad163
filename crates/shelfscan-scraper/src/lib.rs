//! Per-source collection for shelfscan.
//!
//! A [`Collector`] fans one [`ScrapeJob`](shelfscan_core::ScrapeJob) out per
//! source. Each job fetches a search page through a [`PageFetcher`], turns it
//! into listings with that source's [`ExtractionStrategy`], and degrades to
//! AI-assisted or synthetic listings when live extraction comes up empty.

pub mod error;
pub mod fetch;
pub mod handoff;
pub mod orchestrator;
pub mod strategy;

mod retry;

pub use error::{CatalogError, FetchError, PublishError, ScrapeError};
pub use fetch::{
    FetchedPage, FieldSelector, HttpPageFetcher, PageFetcher, PageItem, PageRequest, PageSession,
};
pub use handoff::{
    CatalogStore, ChannelPublisher, JsonFileCatalog, ListingPublisher, PublishedListing,
    PRODUCT_SCRAPED_TOPIC,
};
pub use orchestrator::{CollectionRun, Collector, CollectorConfig, JobSummary};
pub use strategy::{
    DealsStrategy, ExtractionStrategy, SelectorRules, SelectorStrategy, StrategyRegistry,
};
