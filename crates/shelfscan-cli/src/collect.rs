//! The `collect` command and the collector wiring shared with the report commands.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use shelfscan_ai::{AiExtractor, OpenAiCompatibleClient};
use shelfscan_core::{load_source_profiles, AppConfig, Listing, Source, SourceProfiles};
use shelfscan_scraper::{
    CatalogStore, CollectionRun, Collector, CollectorConfig, HttpPageFetcher, JobSummary,
    JsonFileCatalog,
};

use crate::print_json;

#[derive(Debug, Serialize)]
struct CollectOutput<'a> {
    query: &'a str,
    jobs: Vec<JobSummary>,
    listings: Vec<Listing>,
}

/// Source profiles from `SHELFSCAN_SOURCES_PATH`, or the built-in table.
pub(crate) fn load_profiles(config: &AppConfig) -> anyhow::Result<SourceProfiles> {
    match &config.sources_path {
        Some(path) => Ok(load_source_profiles(path)?),
        None => Ok(SourceProfiles::builtin()),
    }
}

/// A collector fetching over HTTP, with AI extraction when an LLM URL is configured.
pub(crate) fn build_collector(
    config: &AppConfig,
    profiles: SourceProfiles,
) -> anyhow::Result<Collector> {
    let fetcher = Arc::new(HttpPageFetcher::new(&config.user_agent));
    let mut collector = Collector::new(fetcher, CollectorConfig::from_app_config(config))
        .with_profiles(profiles);

    if let Some(url) = &config.llm_url {
        let client = OpenAiCompatibleClient::new(
            url,
            &config.llm_model,
            config.llm_api_key.clone(),
            config.llm_timeout_secs,
        )?;
        collector = collector.with_ai(AiExtractor::new(Arc::new(client)));
        tracing::info!(url = %url, model = %config.llm_model, "AI extraction enabled");
    }
    Ok(collector)
}

/// Collects `query` live from every source, or from `source` alone, and
/// prints per-job summaries with the merged listings.
///
/// # Errors
///
/// Returns an error for a blank query, an unreadable sources file or catalog,
/// or an invalid LLM client configuration. Per-source failures are reported
/// in the job summaries, not as errors.
pub(crate) async fn run_collect(
    config: &AppConfig,
    query: &str,
    source: Option<Source>,
    save: Option<&Path>,
) -> anyhow::Result<()> {
    let collector = build_collector(config, load_profiles(config)?)?;

    let run = match source {
        Some(source) => CollectionRun {
            query: query.trim().to_string(),
            jobs: vec![collector.collect_one(source, query).await?],
        },
        None => collector.collect_all(query).await?,
    };
    let jobs = run.summary();
    let listings = run.into_listings();

    if let Some(path) = save {
        let mut catalog = JsonFileCatalog::open(path)?;
        for listing in &listings {
            catalog.upsert(listing.clone());
        }
        catalog.save()?;
    }

    print_json(&CollectOutput {
        query: query.trim(),
        jobs,
        listings,
    })
}

/// Listings for `query`: a text search of `catalog` when given, otherwise a
/// live collection from every source.
pub(crate) async fn gather_listings(
    config: &AppConfig,
    profiles: &SourceProfiles,
    query: &str,
    catalog: Option<&Path>,
) -> anyhow::Result<Vec<Listing>> {
    if let Some(path) = catalog {
        let catalog = JsonFileCatalog::open(path)?;
        let found = catalog.search_by_text(query);
        tracing::info!(path = %path.display(), query, count = found.len(), "catalog search");
        return Ok(found);
    }
    let collector = build_collector(config, profiles.clone())?;
    Ok(collector.collect_all(query).await?.into_listings())
}
