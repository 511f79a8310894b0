//! An in-process adapter with no network calls, for exercising the
//! Aggregator's fan-out, dedup, and sort logic deterministically.

use async_trait::async_trait;
use metaseek_adapter::{finalize_results, SearchContext, EngineAdapter};
use metaseek_core::{Category, EngineConfig, Outcome, Query, SearchError, SearchResult};
use std::time::Duration;

/// Builds a canned response (or a canned failure) instead of calling out to
/// a real backend. Construct with [`MockAdapter::with_results`],
/// [`MockAdapter::empty`], or [`MockAdapter::failing`].
pub struct MockAdapter {
    config: EngineConfig,
    results: Vec<SearchResult>,
    error: Option<SearchError>,
    delay: Option<Duration>,
}

impl MockAdapter {
    pub fn with_results(name: &str, results: Vec<SearchResult>) -> Self {
        Self {
            config: EngineConfig::new(name, name),
            results,
            error: None,
            delay: None,
        }
    }

    pub fn empty(name: &str) -> Self {
        Self::with_results(name, Vec::new())
    }

    pub fn failing(name: &str, error: SearchError) -> Self {
        Self {
            config: EngineConfig::new(name, name),
            results: Vec::new(),
            error: Some(error),
            delay: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.config.priority = priority;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.config.categories = categories;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.config.enabled = false;
        self
    }

    /// Simulates a slow backend, to exercise the Aggregator's timeout path.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl EngineAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn priority(&self) -> i32 {
        self.config.priority
    }

    fn supports_category(&self, category: Category) -> bool {
        self.config.supports_category(category)
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn search(&self, ctx: &SearchContext, _query: &Query) -> Outcome<Vec<SearchResult>> {
        if !self.is_enabled() {
            return Err(SearchError::EngineDisabled(self.name().to_string()));
        }
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.cancellation().cancelled() => return Err(SearchError::Cancelled),
            }
        }
        if let Some(error) = &self.error {
            return Err(clone_error(error));
        }
        Ok(finalize_results(
            self.results.clone(),
            self.name(),
            self.priority(),
        ))
    }
}

fn clone_error(error: &SearchError) -> SearchError {
    match error {
        SearchError::Validation => SearchError::Validation,
        SearchError::NoEngines => SearchError::NoEngines,
        SearchError::NoResults(results) => SearchError::NoResults(results.clone()),
        SearchError::EngineDisabled(name) => SearchError::EngineDisabled(name.clone()),
        SearchError::EngineNotFound(name) => SearchError::EngineNotFound(name.clone()),
        SearchError::EngineTimeout(name) => SearchError::EngineTimeout(name.clone()),
        SearchError::HttpStatus { engine, status } => SearchError::HttpStatus {
            engine: engine.clone(),
            status: *status,
        },
        SearchError::Cancelled => SearchError::Cancelled,
    }
}
