//! Per-source extraction strategies.
//!
//! A strategy knows how to phrase a source's search request and how to turn
//! the fetched page into listings. Strategies are looked up in a
//! [`StrategyRegistry`] keyed by [`Source`].

mod deals;
mod fallback;
mod selectors;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use shelfscan_core::{Listing, Source};

use crate::fetch::{FetchedPage, PageRequest};

pub use deals::DealsStrategy;
pub use selectors::{resolve_ref, rules_for, search_url, SelectorRules, SelectorStrategy};

pub trait ExtractionStrategy: Send + Sync {
    fn source(&self) -> Source;

    /// The search page to fetch for `query`.
    fn page_request(&self, query: &str, navigation_timeout: Duration) -> PageRequest;

    /// Admissible listings found on `page`. An empty result is not an error.
    fn extract(&self, page: &FetchedPage, observed_at: DateTime<Utc>) -> Vec<Listing>;

    /// Synthetic listings used when the source cannot be read.
    fn fallback(
        &self,
        query: &str,
        price_multiplier: f64,
        rng: &mut StdRng,
        observed_at: DateTime<Utc>,
    ) -> Vec<Listing> {
        fallback::synthetic_listings(self.source(), query, price_multiplier, rng, observed_at)
    }
}

/// Strategy lookup keyed by source.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<Source, Arc<dyn ExtractionStrategy>>,
}

impl StrategyRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Adds or replaces the strategy for `strategy.source()`.
    pub fn register(&mut self, strategy: Arc<dyn ExtractionStrategy>) {
        self.strategies.insert(strategy.source(), strategy);
    }

    #[must_use]
    pub fn get(&self, source: Source) -> Option<Arc<dyn ExtractionStrategy>> {
        self.strategies.get(&source).cloned()
    }
}

impl Default for StrategyRegistry {
    /// Every known source: selector rules for groceries, the deals strategy for HotDeals.
    fn default() -> Self {
        let mut registry = Self::empty();
        for source in Source::ALL {
            match rules_for(source) {
                Some(rules) => registry.register(Arc::new(SelectorStrategy::new(source, rules))),
                None => registry.register(Arc::new(DealsStrategy)),
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_every_source() {
        let registry = StrategyRegistry::default();
        for source in Source::ALL {
            let strategy = registry.get(source).expect("strategy registered");
            assert_eq!(strategy.source(), source);
        }
    }

    #[test]
    fn register_replaces_existing_strategy() {
        let mut registry = StrategyRegistry::empty();
        assert!(registry.get(Source::HotDeals).is_none());
        registry.register(Arc::new(DealsStrategy));
        registry.register(Arc::new(DealsStrategy));
        assert!(registry.get(Source::HotDeals).is_some());
        assert_eq!(registry.strategies.len(), 1);
    }
}
