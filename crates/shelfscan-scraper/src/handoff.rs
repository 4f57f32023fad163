//! Hand-off of collected listings to downstream consumers.
//!
//! Two seams: a [`ListingPublisher`] receives every listing of a finished run
//! on the [`PRODUCT_SCRAPED_TOPIC`] topic, and a [`CatalogStore`] keeps
//! listings for later text search. [`ChannelPublisher`] and
//! [`JsonFileCatalog`] are the in-process implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shelfscan_core::Listing;
use tokio::sync::mpsc;

use crate::error::{CatalogError, PublishError};

pub const PRODUCT_SCRAPED_TOPIC: &str = "product-scraped";

#[async_trait]
pub trait ListingPublisher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PublishError`] if the listing could not be handed off.
    async fn publish(&self, topic: &str, listing: &Listing) -> Result<(), PublishError>;
}

/// A listing as delivered through a [`ChannelPublisher`].
#[derive(Debug, Clone)]
pub struct PublishedListing {
    pub topic: String,
    pub listing: Listing,
}

/// Publishes onto a bounded tokio channel.
#[derive(Clone)]
pub struct ChannelPublisher {
    sender: mpsc::Sender<PublishedListing>,
}

impl ChannelPublisher {
    /// Creates the publisher and the receiving end of its channel.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PublishedListing>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ListingPublisher for ChannelPublisher {
    async fn publish(&self, topic: &str, listing: &Listing) -> Result<(), PublishError> {
        self.sender
            .send(PublishedListing {
                topic: topic.to_string(),
                listing: listing.clone(),
            })
            .await
            .map_err(|_| PublishError::Closed {
                topic: topic.to_string(),
            })
    }
}

/// Listing storage with case-insensitive text lookup.
pub trait CatalogStore {
    /// Inserts `listing`, replacing any stored listing with the same id.
    fn upsert(&mut self, listing: Listing);

    /// Listings where every whitespace-separated token of `query` appears in
    /// the name, brand or category. A blank query matches nothing.
    fn search_by_text(&self, query: &str) -> Vec<Listing>;
}

/// A catalog kept in memory and persisted as a JSON array on [`save`](Self::save).
#[derive(Debug)]
pub struct JsonFileCatalog {
    path: PathBuf,
    listings: Vec<Listing>,
}

impl JsonFileCatalog {
    /// Loads the catalog at `path`. A missing file is an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file exists but cannot be read, or
    /// [`CatalogError::Deserialize`] if it holds anything but valid listings.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let listings = match std::fs::read_to_string(path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| CatalogError::Deserialize {
                    path: path.display().to_string(),
                    source: e,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(CatalogError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        tracing::debug!(path = %path.display(), count = listings.len(), "catalog loaded");
        Ok(Self {
            path: path.to_path_buf(),
            listings,
        })
    }

    /// Writes every listing back to the catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if serialization or the write fails.
    pub fn save(&self) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(&self.listings).map_err(CatalogError::Serialize)?;
        std::fs::write(&self.path, json).map_err(|e| CatalogError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        tracing::info!(path = %self.path.display(), count = self.listings.len(), "catalog saved");
        Ok(())
    }

    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }
}

impl CatalogStore for JsonFileCatalog {
    fn upsert(&mut self, listing: Listing) {
        match self.listings.iter_mut().find(|stored| stored.id == listing.id) {
            Some(stored) => *stored = listing,
            None => self.listings.push(listing),
        }
    }

    fn search_by_text(&self, query: &str) -> Vec<Listing> {
        let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if tokens.is_empty() {
            return Vec::new();
        }
        self.listings
            .iter()
            .filter(|listing| {
                let haystack = format!(
                    "{} {} {}",
                    listing.raw_name,
                    listing.brand.as_deref().unwrap_or_default(),
                    listing.category.as_deref().unwrap_or_default()
                )
                .to_lowercase();
                tokens.iter().all(|token| haystack.contains(token.as_str()))
            })
            .cloned()
            .collect()
    }
}
