//! metaseek — a privacy-respecting metasearch aggregator.
//!
//! This binary is a minimal demonstration shim around the search core: it
//! wires a `Registry` of the reference adapters from `metaseek-engines` into
//! an `Aggregator`, runs one search for the query given on the command
//! line, and prints the ranked results. The surrounding product's full
//! command surface (config files, daemonization, HTTP front end, Tor
//! transport, admin bootstrap) is out of scope per spec.md §1 — this is the
//! library-shaped crate's demo entry point, not that product.

use anyhow::Result;
use clap::Parser;
use metaseek_adapter::SearchContext;
use metaseek_aggregator::{Aggregator, AggregatorConfig};
use metaseek_cache::ResultCache;
use metaseek_core::{Category, Query, SearchError, SortOrder};
use metaseek_engines::{DuckDuckGoAdapter, HackerNewsAdapter, WikipediaAdapter};
use metaseek_registry::Registry;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Run a single metasearch query against the built-in reference adapters.
#[derive(Parser)]
#[command(name = "metaseek")]
#[command(about = "Privacy-respecting metasearch aggregator (search core demo)")]
#[command(version)]
struct Cli {
    /// The search text, operators included (e.g. `rust site:github.com`).
    query: String,

    /// Content category: general, images, videos, news, maps, files, code,
    /// science, social, it.
    #[arg(long, default_value = "general")]
    category: String,

    /// 1-based result page.
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Results per page.
    #[arg(long, default_value_t = 10)]
    per_page: u32,

    /// Sort order: relevance, date, date-asc, popularity, random.
    #[arg(long, default_value = "relevance")]
    sort: String,

    /// Language tag (defaults to the spec's `en` sentinel).
    #[arg(long, default_value = "en")]
    lang: String,

    /// Fan-out deadline in seconds.
    #[arg(long, default_value_t = 8)]
    timeout: u64,

    /// Enable debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("metaseek={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    let category = Category::from_str(&cli.category).unwrap_or_else(|_| {
        warn!(category = %cli.category, "unrecognized category, falling back to general");
        Category::General
    });
    let sort = SortOrder::from_str(&cli.sort).unwrap_or_else(|_| {
        warn!(sort = %cli.sort, "unrecognized sort order, falling back to relevance");
        SortOrder::Relevance
    });

    let registry = Registry::new();
    registry.register(Arc::new(WikipediaAdapter::new())).await;
    registry.register(Arc::new(HackerNewsAdapter::new())).await;
    registry.register(Arc::new(DuckDuckGoAdapter::new())).await;
    let engine_count = registry.len().await;
    info!(engines = engine_count, "registry populated");

    let aggregator = Aggregator::new(
        registry,
        ResultCache::with_defaults(),
        AggregatorConfig {
            timeout_secs: cli.timeout,
            cache_enabled: true,
        },
    );

    let mut query = Query::new(cli.query);
    query.category = category;
    query.page = cli.page;
    query.per_page = cli.per_page;
    query.sort = sort;
    query.language = cli.lang;

    let ctx = SearchContext::new(CancellationToken::new());
    match aggregator.search(&ctx, query).await {
        Ok(results) => print_results(&results),
        Err(SearchError::NoResults(results)) => {
            info!("no results found");
            print_results(&results);
        }
        Err(err) => {
            error!(error = %err, "search failed");
            return Err(err.into());
        }
    }

    Ok(())
}

fn print_results(results: &metaseek_core::SearchResults) {
    println!(
        "{} result(s) for \"{}\" (page {}/{}, {:.3}s, engines: {})",
        results.total_count,
        results.query,
        results.page,
        results.total_pages,
        results.search_time,
        if results.engines_used.is_empty() {
            "none".to_string()
        } else {
            results.engines_used.join(", ")
        }
    );
    for (i, result) in results.results.iter().enumerate() {
        println!(
            "{:>2}. [{}] {}\n    {}\n    {}",
            i + 1,
            result.engine,
            result.title,
            result.url,
            result.content
        );
    }
}
