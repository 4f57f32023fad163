//! `compare`, `recommend` and `insights` commands.

use std::path::Path;

use shelfscan_analysis::{Analyzer, SortOrder};
use shelfscan_core::AppConfig;

use crate::collect::{gather_listings, load_profiles};
use crate::print_json;

pub(crate) async fn run_compare(
    config: &AppConfig,
    query: &str,
    catalog: Option<&Path>,
    sort: SortOrder,
) -> anyhow::Result<()> {
    let profiles = load_profiles(config)?;
    let listings = gather_listings(config, &profiles, query, catalog).await?;
    let analyzer = Analyzer::new(profiles);
    print_json(&analyzer.compare(query, &listings, sort))
}

pub(crate) async fn run_recommend(
    config: &AppConfig,
    query: &str,
    budget: Option<&str>,
    category: Option<&str>,
    catalog: Option<&Path>,
) -> anyhow::Result<()> {
    let profiles = load_profiles(config)?;
    let listings = gather_listings(config, &profiles, query, catalog).await?;
    let analyzer = Analyzer::new(profiles);
    print_json(&analyzer.recommend(&listings, budget, category))
}

pub(crate) async fn run_insights(
    config: &AppConfig,
    query: &str,
    catalog: Option<&Path>,
) -> anyhow::Result<()> {
    let profiles = load_profiles(config)?;
    let listings = gather_listings(config, &profiles, query, catalog).await?;
    let analyzer = Analyzer::new(profiles);
    print_json(&analyzer.insights(&listings))
}
