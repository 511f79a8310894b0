//! # metaseek-adapter
//!
//! The polymorphic backend adapter contract (spec §4.3): the capability set
//! the Registry and Aggregator consume from every upstream integration, plus
//! the `SearchContext` that carries cancellation and deadline across a
//! fan-out call.
//!
//! Adapters are deliberately thin: build a URL, issue one GET with a fixed
//! User-Agent, parse the response, map it onto `SearchResult`. They must not
//! share mutable state across calls — a `&self` adapter method never reaches
//! for interior mutability to remember anything between searches.

use async_trait::async_trait;
use metaseek_core::{Category, EngineConfig, Outcome, Query, SearchResult};
use tokio_util::sync::CancellationToken;

/// A fixed desktop browser User-Agent, sent by every adapter (spec §6).
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

/// Per-call context threaded through a fan-out: the Aggregator derives one
/// `CancellationToken` per search (cancelled when its configured timeout
/// fires) and clones it into every adapter task.
#[derive(Clone)]
pub struct SearchContext {
    cancellation: CancellationToken,
}

impl SearchContext {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// A context with no deadline, for direct adapter unit tests.
    pub fn unbounded() -> Self {
        Self::new(CancellationToken::new())
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// The capability set every backend integration implements (spec §4.3/§6).
///
/// `search` must honor `ctx`'s cancellation, tag every result's `engine`
/// field with `name()`, assign ascending 0-based `position`s, and never
/// return a non-empty result slice together with an error — one or the
/// other, never both.
#[async_trait]
pub trait EngineAdapter: Send + Sync {
    /// Lowercase identity, matched case-insensitively by the Registry.
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    fn priority(&self) -> i32;

    fn supports_category(&self, category: Category) -> bool;

    fn config(&self) -> &EngineConfig;

    async fn search(&self, ctx: &SearchContext, query: &Query) -> Outcome<Vec<SearchResult>>;
}

/// Assigns `engine`, ascending `position`, and the base score from spec
/// §4.3 (`priority*100 + (100 - position) + duplicates*50`, with
/// `duplicates` defaulting to 1 at the adapter — the Aggregator's dedup
/// pass later adds `(count - 1) * 50` on top as more copies are found) to a
/// freshly built batch of hits. Adapters call this once, right before
/// returning, instead of repeating the bookkeeping inline.
pub fn finalize_results(
    mut results: Vec<SearchResult>,
    engine: &str,
    priority: i32,
) -> Vec<SearchResult> {
    for (position, result) in results.iter_mut().enumerate() {
        result.engine = engine.to_string();
        result.position = position as u32;
        result.score = priority as f64 * 100.0 + (100 - position as i32).max(0) as f64 + 50.0;
    }
    results
}
