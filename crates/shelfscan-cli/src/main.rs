mod collect;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shelfscan_analysis::SortOrder;
use shelfscan_core::Source;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shelfscan")]
#[command(about = "Collect and compare grocery prices across UK retailers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect listings for a query from every source (or one)
    Collect {
        query: String,

        /// Collect from a single source, e.g. `tesco` or `"B&M"`
        #[arg(long)]
        source: Option<Source>,

        /// Upsert the collected listings into this JSON catalog file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Compare prices for a query
    Compare {
        query: String,

        /// Read listings from a JSON catalog instead of collecting live
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Ordering of the listings in the output
        #[arg(long, default_value_t = SortOrder::Score)]
        sort: SortOrder,
    },
    /// Rank the best listings for a query
    Recommend {
        query: String,

        /// Exclude listings priced above this amount
        #[arg(long)]
        budget: Option<String>,

        /// Only consider listings in this category
        #[arg(long)]
        category: Option<String>,

        /// Read listings from a JSON catalog instead of collecting live
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Summarize a query's listings as plain-text findings
    Insights {
        query: String,

        /// Read listings from a JSON catalog instead of collecting live
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shelfscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Collect {
            query,
            source,
            save,
        } => collect::run_collect(&config, &query, source, save.as_deref()).await,
        Commands::Compare {
            query,
            catalog,
            sort,
        } => report::run_compare(&config, &query, catalog.as_deref(), sort).await,
        Commands::Recommend {
            query,
            budget,
            category,
            catalog,
        } => {
            report::run_recommend(
                &config,
                &query,
                budget.as_deref(),
                category.as_deref(),
                catalog.as_deref(),
            )
            .await
        }
        Commands::Insights { query, catalog } => {
            report::run_insights(&config, &query, catalog.as_deref()).await
        }
    }
}

/// Prints `value` to stdout as pretty JSON.
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
