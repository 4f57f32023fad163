//! Concurrent per-source collection.
//!
//! [`Collector::collect_all`] starts one worker per enabled source, bounds
//! each by the job timeout and merges the finished jobs in source declaration
//! order. A failing, hanging or panicking worker only affects its own job.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use shelfscan_ai::{AiExtractor, UNKNOWN_BRAND};
use shelfscan_core::matching::{
    annotate_listing, annotate_listing_with_coverage, bound_confidence, query_coverage,
};
use shelfscan_core::normalize::normalize_listing;
use shelfscan_core::{AppConfig, JobStatus, Listing, ScrapeJob, Source, SourceProfiles};
use tokio::task::JoinHandle;

use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::handoff::{ListingPublisher, PRODUCT_SCRAPED_TOPIC};
use crate::retry::retry_with_backoff;
use crate::strategy::{ExtractionStrategy, StrategyRegistry};

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Wall-clock budget for one source's job.
    pub job_timeout: Duration,
    /// Budget for a single page navigation.
    pub navigation_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Seed for synthetic listings; each job mixes in its source index.
    pub fallback_seed: Option<u64>,
    /// Sources to collect from, in merge order.
    pub sources: Vec<Source>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            job_timeout: Duration::from_secs(30),
            navigation_timeout: Duration::from_secs(15),
            max_retries: 3,
            backoff_base_ms: 500,
            fallback_seed: None,
            sources: Source::ALL.to_vec(),
        }
    }
}

impl CollectorConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            job_timeout: Duration::from_secs(config.job_timeout_secs),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            max_retries: config.fetch_max_retries,
            backoff_base_ms: config.fetch_backoff_base_ms,
            fallback_seed: config.fallback_seed,
            sources: Source::ALL.to_vec(),
        }
    }
}

/// Per-job outcome, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub source: Source,
    pub status: JobStatus,
    pub listing_count: usize,
    pub duration_ms: Option<i64>,
    pub error_reason: Option<String>,
}

/// Every job of one `collect_all` call, in source declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionRun {
    pub query: String,
    pub jobs: Vec<ScrapeJob>,
}

impl CollectionRun {
    /// Listings of succeeded jobs, in job order.
    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.jobs
            .iter()
            .filter(|job| job.status() == JobStatus::Succeeded)
            .flat_map(ScrapeJob::listings)
    }

    #[must_use]
    pub fn into_listings(self) -> Vec<Listing> {
        self.jobs
            .into_iter()
            .filter(|job| job.status() == JobStatus::Succeeded)
            .flat_map(ScrapeJob::into_listings)
            .collect()
    }

    #[must_use]
    pub fn summary(&self) -> Vec<JobSummary> {
        self.jobs
            .iter()
            .map(|job| JobSummary {
                source: job.source(),
                status: job.status(),
                listing_count: job.listings().len(),
                duration_ms: job.duration_ms(),
                error_reason: job.error_reason().map(str::to_string),
            })
            .collect()
    }
}

pub struct Collector {
    fetcher: Arc<dyn PageFetcher>,
    registry: StrategyRegistry,
    profiles: SourceProfiles,
    ai: Option<AiExtractor>,
    publisher: Option<Arc<dyn ListingPublisher>>,
    config: CollectorConfig,
}

impl Collector {
    /// A collector with every built-in strategy and the default source profiles.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: CollectorConfig) -> Self {
        Self {
            fetcher,
            registry: StrategyRegistry::default(),
            profiles: SourceProfiles::default(),
            ai: None,
            publisher: None,
            config,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_profiles(mut self, profiles: SourceProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    /// Enables AI-assisted extraction when live selectors find nothing.
    #[must_use]
    pub fn with_ai(mut self, ai: AiExtractor) -> Self {
        self.ai = Some(ai);
        self
    }

    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn ListingPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Collects `query` from every enabled source concurrently.
    ///
    /// Always returns one job per enabled source. Total wall time is bounded
    /// by the slowest job, which is itself bounded by the job timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::EmptyQuery`] for a blank query and
    /// [`ScrapeError::UnknownSource`] if an enabled source has no strategy.
    /// No job is started in either case.
    pub async fn collect_all(&self, query: &str) -> Result<CollectionRun, ScrapeError> {
        let query = validate_query(query)?;
        let strategies = self
            .config
            .sources
            .iter()
            .map(|source| self.strategy_for(*source))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(query, sources = strategies.len(), "collection started");
        let started_at = Utc::now();
        let handles: Vec<(Source, JoinHandle<ScrapeJob>)> = strategies
            .into_iter()
            .map(|strategy| (strategy.source(), self.spawn_job(strategy, query)))
            .collect();

        let jobs = join_all(
            handles
                .into_iter()
                .map(|(source, handle)| join_job(source, query, handle, started_at)),
        )
        .await;

        let run = CollectionRun {
            query: query.to_string(),
            jobs,
        };
        let succeeded = run
            .jobs
            .iter()
            .filter(|job| job.status() == JobStatus::Succeeded)
            .count();
        tracing::info!(
            query,
            succeeded,
            failed = run.jobs.len() - succeeded,
            "collection finished"
        );

        self.publish(&run).await;
        Ok(run)
    }

    /// Collects `query` from a single source.
    ///
    /// # Errors
    ///
    /// Same request validation as [`collect_all`](Self::collect_all).
    pub async fn collect_one(&self, source: Source, query: &str) -> Result<ScrapeJob, ScrapeError> {
        let query = validate_query(query)?;
        let strategy = self.strategy_for(source)?;
        let started_at = Utc::now();
        let handle = self.spawn_job(strategy, query);
        Ok(join_job(source, query, handle, started_at).await)
    }

    fn strategy_for(&self, source: Source) -> Result<Arc<dyn ExtractionStrategy>, ScrapeError> {
        self.registry
            .get(source)
            .ok_or_else(|| ScrapeError::UnknownSource(source.to_string()))
    }

    fn spawn_job(&self, strategy: Arc<dyn ExtractionStrategy>, query: &str) -> JoinHandle<ScrapeJob> {
        let source = strategy.source();
        let worker = Worker {
            fetcher: Arc::clone(&self.fetcher),
            strategy,
            ai: self.ai.clone(),
            price_multiplier: self.profiles.price_multiplier(source),
            navigation_timeout: self.config.navigation_timeout,
            max_retries: self.config.max_retries,
            backoff_base_ms: self.config.backoff_base_ms,
            rng: job_rng(self.config.fallback_seed, source),
        };
        let budget = self.config.job_timeout;
        let query = query.to_string();

        tokio::spawn(async move {
            let started_at = Utc::now();
            let deadline = chrono::Duration::from_std(budget)
                .ok()
                .and_then(|budget| started_at.checked_add_signed(budget));
            match tokio::time::timeout(budget, worker.run(&query, started_at, deadline)).await {
                Ok(job) => job,
                Err(_) => {
                    tracing::warn!(source = %source, ?budget, "job timed out");
                    let completed_at = deadline.unwrap_or_else(Utc::now);
                    failed_job(
                        source,
                        &query,
                        format!("timed out after {}s", budget.as_secs()),
                        started_at,
                        completed_at,
                    )
                }
            }
        })
    }

    async fn publish(&self, run: &CollectionRun) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        for listing in run.listings() {
            if let Err(e) = publisher.publish(PRODUCT_SCRAPED_TOPIC, listing).await {
                tracing::warn!(listing = %listing.id, error = %e, "failed to publish listing");
            }
        }
    }
}

fn validate_query(query: &str) -> Result<&str, ScrapeError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ScrapeError::EmptyQuery);
    }
    Ok(query)
}

fn job_rng(seed: Option<u64>, source: Source) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ source.index() as u64),
        None => StdRng::from_os_rng(),
    }
}

async fn join_job(
    source: Source,
    query: &str,
    handle: JoinHandle<ScrapeJob>,
    started_at: DateTime<Utc>,
) -> ScrapeJob {
    match handle.await {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(source = %source, error = %e, "collection worker panicked");
            failed_job(source, query, "worker panicked", started_at, Utc::now())
        }
    }
}

fn failed_job(
    source: Source,
    query: &str,
    reason: impl Into<String>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> ScrapeJob {
    let mut job = ScrapeJob::new(source, query);
    if let Err(e) = job
        .start(started_at)
        .and_then(|()| job.fail(reason, completed_at))
    {
        tracing::error!(source = %source, error = %e, "job state transition rejected");
    }
    job
}

/// Everything one job needs, moved into its task.
struct Worker {
    fetcher: Arc<dyn PageFetcher>,
    strategy: Arc<dyn ExtractionStrategy>,
    ai: Option<AiExtractor>,
    price_multiplier: f64,
    navigation_timeout: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
    rng: StdRng,
}

impl Worker {
    /// Runs the job, stamping completion no later than `deadline`.
    async fn run(
        mut self,
        query: &str,
        started_at: DateTime<Utc>,
        deadline: Option<DateTime<Utc>>,
    ) -> ScrapeJob {
        let source = self.strategy.source();
        let finished_at = || {
            let now = Utc::now();
            deadline.map_or(now, |deadline| now.min(deadline))
        };
        let mut job = ScrapeJob::new(source, query);
        let transition = match job.start(started_at) {
            Ok(()) => match self.collect(query).await {
                Ok(listings) => {
                    tracing::info!(source = %source, count = listings.len(), "job succeeded");
                    job.succeed(listings, finished_at())
                }
                Err(reason) => {
                    tracing::warn!(source = %source, reason = %reason, "job failed");
                    job.fail(reason, finished_at())
                }
            },
            Err(e) => Err(e),
        };
        if let Err(e) = transition {
            tracing::error!(source = %source, error = %e, "job state transition rejected");
        }
        job
    }

    /// Fetch, extract, then degrade: AI on the page text, then synthetic data.
    ///
    /// Only a transient fetch error that outlives every retry fails the job.
    async fn collect(&mut self, query: &str) -> Result<Vec<Listing>, String> {
        let source = self.strategy.source();
        let request = self.strategy.page_request(query, self.navigation_timeout);

        let session = self
            .fetcher
            .open_session()
            .await
            .map_err(|e| format!("page session unavailable: {e}"))?;
        let fetched = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            session.fetch(&request)
        })
        .await;
        drop(session);

        let page = match fetched {
            Ok(page) => Some(page),
            Err(e) if e.is_transient() => {
                return Err(format!(
                    "page fetch failed after {} attempts: {e}",
                    self.max_retries + 1
                ));
            }
            Err(e) => {
                tracing::warn!(source = %source, error = %e, "source unavailable, using fallback");
                None
            }
        };

        let observed_at = Utc::now();
        let mut listings = page
            .as_ref()
            .map(|page| self.strategy.extract(page, observed_at))
            .unwrap_or_default();

        if listings.is_empty() {
            if let (Some(ai), Some(page)) = (&self.ai, &page) {
                listings = ai
                    .extract_structured(&page.raw_text(), source)
                    .await
                    .into_iter()
                    .filter(Listing::is_admissible)
                    .collect();
            }
        }

        if listings.is_empty() {
            tracing::debug!(source = %source, "no live listings, generating synthetic data");
            listings =
                self.strategy
                    .fallback(query, self.price_multiplier, &mut self.rng, observed_at);
        }

        for listing in &mut listings {
            normalize_listing(listing);
        }
        match &self.ai {
            Some(ai) => {
                join_all(
                    listings
                        .iter_mut()
                        .map(|listing| annotate_with_ai(ai, listing, query)),
                )
                .await;
            }
            None => {
                for listing in &mut listings {
                    annotate_listing(listing, query);
                }
            }
        }
        Ok(listings)
    }
}

/// Fills a missing brand from the model and scores the listing against the
/// query with the model's similarity, held near the word-overlap coverage.
async fn annotate_with_ai(ai: &AiExtractor, listing: &mut Listing, query: &str) {
    if listing.brand.is_none() {
        let brand = ai.extract_brand(&listing.raw_name).await;
        if brand != UNKNOWN_BRAND {
            listing.brand = Some(brand);
        }
    }
    let overlap = query_coverage(query, &listing.raw_name);
    let similarity = ai.match_confidence(query, &listing.raw_name).await;
    annotate_listing_with_coverage(listing, bound_confidence(similarity, overlap));
}
