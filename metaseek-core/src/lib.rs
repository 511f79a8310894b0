//! # metaseek-core
//!
//! Shared data model and error taxonomy for the metaseek search core: the
//! `Query`/`Operators` pair, the `SearchResult`/`SearchResults` response
//! shape, adapter descriptors (`EngineConfig`), and the cache's stored
//! value. Every other crate in the workspace (`metaseek-parser`,
//! `metaseek-adapter`, `metaseek-registry`, `metaseek-cache`,
//! `metaseek-related`, `metaseek-engines`, `metaseek-aggregator`) depends on
//! this one; it depends on none of them.

pub mod error;
pub mod types;

pub use error::{Outcome, SearchError};
pub use types::{
    CacheEntry, Category, DateRange, EngineConfig, NumericRange, Operators, Query, SearchResult,
    SearchResults, SortOrder, DEFAULT_LANGUAGE,
};
