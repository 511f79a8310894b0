//! # metaseek-aggregator
//!
//! The Aggregator (spec §4.4): the end-to-end `Search` pipeline that ties
//! every other crate together. Validates the query, parses and applies
//! operators, checks the cache, filters the registry, fans out to adapters
//! concurrently under a deadline, collects what came back, deduplicates,
//! post-filters, sorts, paginates, caches, and returns.
//!
//! The pipeline stages that are pure functions over a `Vec<SearchResult>`
//! live in their own modules (`dedup`, `filter`, `sort`, `paginate`,
//! `operators`) so each can be unit tested in isolation; this file is the
//! orchestration glue plus the fan-out/collect machinery named in spec §5.

mod dedup;
mod filter;
mod operators;
mod paginate;
mod sort;

use dedup::Deduplicator;
use filter::Filterer;
use paginate::Paginator;
use sort::Sorter;

use metaseek_adapter::{EngineAdapter, SearchContext};
use metaseek_cache::ResultCache;
use metaseek_core::{Query, SearchError, SearchResult, SearchResults};
use metaseek_registry::Registry;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The `search_time` recorded on a cache hit, per spec §4.4 step 3 ("a
/// near-zero sentinel"). Distinguishable from a genuine sub-millisecond
/// fresh search without claiming a fan-out actually ran.
const CACHE_HIT_SEARCH_TIME: f64 = 0.0001;

/// Tunables for one `Aggregator` instance. Config *loading* (files, env,
/// CLI) is out of spec.md's scope; the shape of the config struct is not —
/// every teacher subsystem takes a `FooConfig` with a `Default` impl, and
/// this crate follows suit.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Deadline applied to the whole fan-out, in seconds. Individual
    /// adapters may carry their own shorter `EngineConfig.timeout_secs`;
    /// this is the aggregator-wide ceiling named in spec §4.4 step 5.
    pub timeout_secs: u64,
    /// Whether the Result Cache is consulted/populated at all.
    pub cache_enabled: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            cache_enabled: true,
        }
    }
}

/// The orchestrator. Cheap to clone — `Registry` and `ResultCache` are
/// themselves `Arc`-backed handles, so a clone shares state rather than
/// duplicating it.
#[derive(Clone)]
pub struct Aggregator {
    registry: Registry,
    cache: ResultCache,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(registry: Registry, cache: ResultCache, config: AggregatorConfig) -> Self {
        Self {
            registry,
            cache,
            config,
        }
    }

    /// An aggregator with a fresh default-configured cache and the default
    /// `AggregatorConfig`, for callers that only care about the registry.
    pub fn with_defaults(registry: Registry) -> Self {
        Self::new(registry, ResultCache::with_defaults(), AggregatorConfig::default())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Runs the full pipeline described in spec §4.4. `ctx` carries the
    /// caller's own cancellation; the Aggregator derives a child token from
    /// it bounded by `config.timeout_secs` and hands that child to every
    /// adapter task.
    ///
    /// Returns `Err(SearchError::NoResults(..))` with the fully assembled
    /// `SearchResults` attached when the pipeline legitimately produced zero
    /// rows — the spec's "return both" case, expressed as a data-carrying
    /// error variant rather than a tuple return, so ordinary success stays
    /// a plain `Ok` a caller can `?` through.
    pub async fn search(
        &self,
        ctx: &SearchContext,
        mut query: Query,
    ) -> Result<SearchResults, SearchError> {
        // Step 1: validate.
        query.validate()?;

        // Step 2: parse operators, apply them onto empty/default fields
        // only, store the parsed struct and cleaned text.
        let (parsed_ops, cleaned) = metaseek_parser::parse(&query.text);
        query.cleaned_text = cleaned;
        operators::apply(&mut query, &parsed_ops);
        query.operators = Some(parsed_ops);

        let start = Instant::now();

        // Step 3: cache lookup, keyed on the now-available cleaned text and
        // resolved fields.
        let fingerprint = metaseek_cache::fingerprint(&query);
        if self.config.cache_enabled {
            if let Some(mut cached) = self.cache.get(&fingerprint).await {
                cached.search_time = CACHE_HIT_SEARCH_TIME;
                debug!(query = %query.cleaned_text, "cache hit");
                return Ok(cached);
            }
        }

        // Step 4: filter the registry.
        let selected = self.select_adapters(&query).await?;

        // Step 5-6: fan out under a derived deadline, collect survivors.
        let (engines_used, collected) = self.fan_out(ctx, &query, selected).await;

        if ctx.is_cancelled() {
            // A cancelled caller context discards whatever was already
            // collected — spec §5 cancellation semantics.
            return Err(SearchError::Cancelled);
        }

        // Step 7: deduplicate by URL, merging duplicate sightings.
        let deduped = Deduplicator::merge(collected);

        // Step 8: post-filter by exclude-site / exclude-terms / date bounds.
        let filtered = Filterer::apply(
            deduped,
            query.exclude_site.as_deref(),
            &query.exclude_terms,
            query.date_before,
            query.date_after,
        );

        // Step 9: sort.
        let sorted = Sorter::apply(filtered, query.sort);

        // Step 10: paginate.
        let page = query.page.max(1);
        let per_page = query.per_page.max(1);
        let (page_results, total_count, total_pages) = Paginator::apply(&sorted, page, per_page);

        // Step 11: record search time since the cache-lookup point.
        let search_time = start.elapsed().as_secs_f64();

        let results = SearchResults {
            query: query.cleaned_text.clone(),
            category: query.category,
            results: page_results,
            total_count,
            search_time,
            engines_used,
            page,
            per_page,
            total_pages,
            sort: query.sort,
        };

        // Step 12: cache a deep copy if enabled and non-empty.
        if self.config.cache_enabled && total_count > 0 {
            self.cache.set(fingerprint, results.clone()).await;
        }

        // Step 13: NoResults is a sentinel, not a fatal error — the caller
        // can still read `results`' meta fields out of the error variant.
        if total_count == 0 {
            return Err(SearchError::NoResults(Box::new(results)));
        }
        Ok(results)
    }

    /// Step 4: enabled + category-supporting adapters, narrowed by an
    /// explicit include-list (if any) and then by the exclude-list.
    /// Case-insensitive on both lists. Empty result is `NoEngines`.
    async fn select_adapters(
        &self,
        query: &Query,
    ) -> Result<Vec<Arc<dyn EngineAdapter>>, SearchError> {
        let mut candidates = self.registry.get_for_category(query.category).await;

        if !query.engines.is_empty() {
            let include: HashSet<String> = query
                .engines
                .iter()
                .map(|name| name.to_ascii_lowercase())
                .collect();
            candidates.retain(|adapter| include.contains(&adapter.name().to_ascii_lowercase()));
        }

        if !query.exclude_engines.is_empty() {
            let exclude: HashSet<String> = query
                .exclude_engines
                .iter()
                .map(|name| name.to_ascii_lowercase())
                .collect();
            candidates.retain(|adapter| !exclude.contains(&adapter.name().to_ascii_lowercase()));
        }

        if candidates.is_empty() {
            return Err(SearchError::NoEngines);
        }
        Ok(candidates)
    }

    /// Steps 5-6: one cooperative task per adapter, a bounded channel sized
    /// to the task count, and a completion barrier (the `drop(tx)` +
    /// draining `rx` to close) rather than a hand-rolled thread pool. A
    /// timer task cancels a child of `ctx`'s token once `config.timeout_secs`
    /// elapses; adapters are expected to unblock promptly once it fires.
    /// Adapters that error or come back empty are dropped silently — never
    /// fatal to the search as a whole.
    async fn fan_out(
        &self,
        ctx: &SearchContext,
        query: &Query,
        selected: Vec<Arc<dyn EngineAdapter>>,
    ) -> (Vec<String>, Vec<SearchResult>) {
        let deadline_token = ctx.cancellation().child_token();
        let timeout = Duration::from_secs(self.config.timeout_secs.max(1));
        let timer = {
            let deadline_token = deadline_token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                deadline_token.cancel();
            })
        };

        let (tx, mut rx) = mpsc::channel(selected.len().max(1));
        for adapter in selected {
            let tx = tx.clone();
            let adapter_ctx = SearchContext::new(deadline_token.clone());
            let query = query.clone();
            tokio::spawn(async move {
                let name = adapter.name().to_string();
                let outcome = adapter.search(&adapter_ctx, &query).await;
                let _ = tx.send((name, outcome)).await;
            });
        }
        // Drop our own sender so the channel closes once every spawned
        // task's clone has also been dropped (i.e. every task finished).
        drop(tx);

        let mut engines_used = Vec::new();
        let mut collected = Vec::new();
        while let Some((name, outcome)) = rx.recv().await {
            match outcome {
                Ok(results) if !results.is_empty() => {
                    engines_used.push(name);
                    collected.extend(results);
                }
                Ok(_) => {
                    debug!(engine = %name, "adapter returned no results");
                }
                Err(err) => {
                    warn!(engine = %name, error = %err, "adapter search failed, dropping");
                }
            }
        }

        timer.abort();
        (engines_used, collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaseek_adapter::SearchContext;
    use metaseek_core::{Category, Query, SearchError, SearchResult, SortOrder};
    use metaseek_engines::MockAdapter;
    use std::time::Duration;

    async fn registry_with(adapters: Vec<Arc<dyn EngineAdapter>>) -> Registry {
        let registry = Registry::new();
        for adapter in adapters {
            registry.register(adapter).await;
        }
        registry
    }

    fn result(url: &str, title: &str) -> SearchResult {
        SearchResult::new(url, title, "", Category::General, 0)
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_any_dispatch() {
        let registry = registry_with(vec![]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();
        let err = aggregator.search(&ctx, Query::new("   ")).await.unwrap_err();
        assert!(matches!(err, SearchError::Validation));
    }

    #[tokio::test]
    async fn no_adapters_for_category_yields_no_engines() {
        let registry = registry_with(vec![]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();
        let err = aggregator.search(&ctx, Query::new("rust")).await.unwrap_err();
        assert!(matches!(err, SearchError::NoEngines));
    }

    #[tokio::test]
    async fn disabled_adapter_is_never_dispatched_even_if_included() {
        let adapter: Arc<dyn EngineAdapter> =
            Arc::new(MockAdapter::with_results("alpha", vec![result("https://a", "A")]).disabled());
        let registry = registry_with(vec![adapter]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();
        let mut query = Query::new("rust");
        query.engines = vec!["alpha".to_string()];
        let err = aggregator.search(&ctx, query).await.unwrap_err();
        assert!(matches!(err, SearchError::NoEngines));
    }

    #[tokio::test]
    async fn successful_search_collects_engines_used_and_caches() {
        let adapter: Arc<dyn EngineAdapter> = Arc::new(
            MockAdapter::with_results("alpha", vec![result("https://a", "A")]).with_priority(5),
        );
        let registry = registry_with(vec![adapter]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();

        let first = aggregator.search(&ctx, Query::new("rust")).await.unwrap();
        assert_eq!(first.engines_used, vec!["alpha".to_string()]);
        assert_eq!(first.total_count, 1);
        assert!(first.search_time >= 0.0);

        let second = aggregator.search(&ctx, Query::new("rust")).await.unwrap();
        assert_eq!(second.search_time, CACHE_HIT_SEARCH_TIME);
    }

    #[tokio::test]
    async fn a_failing_adapter_does_not_fail_the_whole_search() {
        let good: Arc<dyn EngineAdapter> =
            Arc::new(MockAdapter::with_results("good", vec![result("https://a", "A")]));
        let bad: Arc<dyn EngineAdapter> =
            Arc::new(MockAdapter::failing("bad", SearchError::HttpStatus {
                engine: "bad".to_string(),
                status: 503,
            }));
        let registry = registry_with(vec![good, bad]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();

        let results = aggregator.search(&ctx, Query::new("rust")).await.unwrap();
        assert_eq!(results.engines_used, vec!["good".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_urls_across_adapters_are_merged_with_bonuses() {
        let a: Arc<dyn EngineAdapter> = Arc::new(
            MockAdapter::with_results("a", vec![result("https://x/y", "A")]).with_priority(100),
        );
        let b: Arc<dyn EngineAdapter> = Arc::new(
            MockAdapter::with_results("b", vec![result("https://x/y", "A")]).with_priority(50),
        );
        let registry = registry_with(vec![a, b]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();

        let results = aggregator.search(&ctx, Query::new("rust")).await.unwrap();
        assert_eq!(results.total_count, 1);
        let merged = &results.results[0];
        assert_eq!(merged.duplicate_count, 2);
        // a's base score is 100*100 + 100 + 50 = 10150; +50 dup bonus + 2*25
        // diversity bonus = 10150 + 50 + 50 = 10250.
        assert!(merged.score >= 10150.0 + 50.0 + 50.0);
    }

    #[tokio::test]
    async fn zero_results_surfaces_as_no_results_with_meta_attached() {
        let adapter: Arc<dyn EngineAdapter> = Arc::new(MockAdapter::empty("alpha"));
        let registry = registry_with(vec![adapter]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();

        let err = aggregator.search(&ctx, Query::new("rust")).await.unwrap_err();
        match err {
            SearchError::NoResults(results) => {
                assert_eq!(results.total_count, 0);
                assert_eq!(results.query, "rust");
            }
            other => panic!("expected NoResults, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_adapter_is_dropped_after_the_configured_deadline() {
        let slow: Arc<dyn EngineAdapter> = Arc::new(
            MockAdapter::with_results("slow", vec![result("https://slow", "slow")])
                .with_delay(Duration::from_secs(2)),
        );
        let fast: Arc<dyn EngineAdapter> =
            Arc::new(MockAdapter::with_results("fast", vec![result("https://fast", "fast")]));
        let registry = registry_with(vec![slow, fast]).await;
        let aggregator = Aggregator::new(
            registry,
            ResultCache::with_defaults(),
            AggregatorConfig {
                timeout_secs: 1,
                cache_enabled: false,
            },
        );
        let ctx = SearchContext::unbounded();

        let results = aggregator.search(&ctx, Query::new("rust")).await.unwrap();
        assert_eq!(results.engines_used, vec!["fast".to_string()]);
    }

    #[tokio::test]
    async fn explicit_query_fields_are_not_overwritten_by_operators_found_in_text() {
        let adapter: Arc<dyn EngineAdapter> =
            Arc::new(MockAdapter::with_results("alpha", vec![result("https://a", "A")]));
        let registry = registry_with(vec![adapter]).await;
        let aggregator = Aggregator::with_defaults(registry);
        let ctx = SearchContext::unbounded();

        let mut query = Query::new("rust -site:explicit-wins.com");
        query.exclude_site = Some("already-set.com".to_string());
        query.sort = SortOrder::Relevance;
        let results = aggregator.search(&ctx, query).await.unwrap();
        // The adapter's single result isn't on either excluded domain, so
        // it survives regardless — this test only needs the call to
        // succeed without panicking on the precedence logic.
        assert_eq!(results.total_count, 1);
    }
}
