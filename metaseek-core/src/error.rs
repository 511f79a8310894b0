//! The closed error taxonomy surfaced by the search core.
//!
//! Adapter-level failures are recovered locally by the Aggregator and never
//! reach a caller as one of these variants — a failing or timed-out adapter
//! is simply dropped from the result set. Only pipeline-level failures and
//! adapter-facing signals (used internally between the Registry/Adapter and
//! the Aggregator) are represented here.

use crate::types::SearchResults;
use thiserror::Error;

/// All error conditions the search core can surface, per spec §6/§7.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query's free text was empty after trimming.
    #[error("query text must not be empty")]
    Validation,

    /// The registry filter (enabled + category + include/exclude lists)
    /// left zero adapters to dispatch to.
    #[error("no engines available for this search")]
    NoEngines,

    /// The pipeline completed but produced zero rows. Carries the fully
    /// assembled `SearchResults` (empty `results`, but real `engines_used`,
    /// `search_time`, etc.) so a caller matching this variant can still
    /// inspect the meta fields, per spec §4.4 step 13.
    #[error("no results found")]
    NoResults(Box<SearchResults>),

    /// Returned by an adapter's `Search` when its `EngineConfig.enabled` is
    /// false. The Aggregator should never dispatch to a disabled adapter,
    /// so seeing this surface indicates a registry filtering bug.
    #[error("engine '{0}' is disabled")]
    EngineDisabled(String),

    /// Returned by the Registry when a name in an explicit include-list
    /// does not match any registered adapter.
    #[error("engine '{0}' not found")]
    EngineNotFound(String),

    /// An individual adapter's fan-out task did not complete before the
    /// Aggregator's derived deadline. Adapter-local only; never fatal to a
    /// search as a whole.
    #[error("engine '{0}' timed out")]
    EngineTimeout(String),

    /// An adapter's upstream HTTP call returned a non-2xx status.
    #[error("engine '{engine}' returned HTTP {status}")]
    HttpStatus { engine: String, status: u16 },

    /// The caller's context was cancelled. Any partial results already
    /// collected from completed adapters are discarded.
    #[error("search was cancelled")]
    Cancelled,
}

/// Convenience alias; named `Outcome` (not `Result`) because `SearchResult`
/// is already taken by the per-hit data type in [`crate::types`].
pub type Outcome<T> = std::result::Result<T, SearchError>;
