//! Core data model for the search pipeline: `Query`, `Operators`, the
//! per-hit `SearchResult`, the response envelope `SearchResults`, adapter
//! descriptors (`EngineConfig`), and the cache's stored value (`CacheEntry`).
//!
//! Types here carry no behavior beyond small, total helper methods —
//! parsing, dispatch, caching, and ranking live in their own crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Coarse content tag. Closed set per spec glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Images,
    Videos,
    News,
    Maps,
    Files,
    Code,
    Science,
    Social,
    It,
}

impl Default for Category {
    fn default() -> Self {
        Category::General
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::General => "general",
            Category::Images => "images",
            Category::Videos => "videos",
            Category::News => "news",
            Category::Maps => "maps",
            Category::Files => "files",
            Category::Code => "code",
            Category::Science => "science",
            Category::Social => "social",
            Category::It => "it",
        })
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Category::General),
            "images" => Ok(Category::Images),
            "videos" => Ok(Category::Videos),
            "news" => Ok(Category::News),
            "maps" => Ok(Category::Maps),
            "files" => Ok(Category::Files),
            "code" => Ok(Category::Code),
            "science" => Ok(Category::Science),
            "social" => Ok(Category::Social),
            "it" => Ok(Category::It),
            _ => Err(()),
        }
    }
}

/// Result ordering requested by the caller. `Relevance` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    Relevance,
    Date,
    DateAsc,
    Popularity,
    Random,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Relevance
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "relevance" => Ok(SortOrder::Relevance),
            "date" => Ok(SortOrder::Date),
            "date-asc" => Ok(SortOrder::DateAsc),
            "popularity" => Ok(SortOrder::Popularity),
            "random" => Ok(SortOrder::Random),
            _ => Err(()),
        }
    }
}

/// A `daterange:N-N` operator value, kept as raw bounds rather than resolved
/// into absolute dates — resolution policy belongs to whichever adapter
/// dialect ends up receiving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

/// A numeric range operator, from either `N..N` or `$N..$N`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub low: f64,
    pub high: f64,
}

/// The structured directive set extracted from a raw query string by the
/// Operator Parser (spec §4.1). Never mutated after construction — the
/// Aggregator only ever reads from it when applying operators to a `Query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operators {
    /// First `site:` occurrence only. See `site_all` for every occurrence.
    pub site: Option<String>,
    /// Every `site:` occurrence, in input order (spec §4.1: "multiple
    /// occurrences ... are all collected in list fields, but the singular
    /// field records the first occurrence only").
    pub site_all: Vec<String>,
    pub exclude_site: Vec<String>,
    pub filetype: Vec<String>,

    pub inurl: Option<String>,
    pub all_in_url: Option<String>,
    pub intitle: Option<String>,
    pub all_in_title: Option<String>,
    pub intext: Option<String>,
    pub all_in_text: Option<String>,
    pub inanchor: Option<String>,
    pub all_in_anchor: Option<String>,

    pub exact_phrases: Vec<String>,
    pub excluded_terms: Vec<String>,

    pub before: Option<chrono::NaiveDate>,
    pub after: Option<chrono::NaiveDate>,
    pub daterange: Option<DateRange>,
    pub numeric_range: Option<NumericRange>,

    pub define: Option<String>,
    pub weather: Option<String>,
    pub stocks: Option<String>,
    pub map: Option<String>,
    pub movie: Option<String>,
    pub source: Option<String>,
    pub related: Option<String>,
    pub cache: Option<String>,
    pub info: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,

    pub has_or: bool,
    pub has_and: bool,
    pub has_wildcard: bool,
}

impl Operators {
    /// True when no directive was recognized at all — the cleaned text
    /// equals the trimmed input and nothing need be applied to a `Query`.
    pub fn is_empty(&self) -> bool {
        self == &Operators::default()
    }
}

/// A single user request. Immutable after the Aggregator applies operators
/// in step 2 of the pipeline; the Aggregator exclusively owns it during a
/// `Search` call — no other component mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub category: Category,
    pub page: u32,
    pub per_page: u32,
    pub sort: SortOrder,
    pub language: String,
    pub region: Option<String>,
    pub safesearch: u8,
    pub time_range: Option<String>,

    /// Populated by the Aggregator during pipeline step 2; `None` until then.
    pub operators: Option<Operators>,
    /// Populated alongside `operators`; empty string until parsed.
    pub cleaned_text: String,

    /// Case-insensitive adapter name include-list. Empty means "all enabled".
    pub engines: Vec<String>,
    /// Case-insensitive adapter name exclude-list, applied after the
    /// include-list.
    pub exclude_engines: Vec<String>,

    /// Post-filter: drop results whose URL's host contains this substring.
    pub exclude_site: Option<String>,
    /// Post-filter: drop results whose title+content contain any of these.
    pub exclude_terms: Vec<String>,
    pub date_before: Option<DateTime<Utc>>,
    pub date_after: Option<DateTime<Utc>>,
}

/// The language field's default sentinel, per spec §4.4 step 2.
pub const DEFAULT_LANGUAGE: &str = "en";

impl Query {
    /// A new query with every optional field at its spec-defined default:
    /// page 1, 10 per page, relevance sort, language `en`, safesearch 1.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: Category::General,
            page: 1,
            per_page: 10,
            sort: SortOrder::Relevance,
            language: DEFAULT_LANGUAGE.to_string(),
            region: None,
            safesearch: 1,
            time_range: None,
            operators: None,
            cleaned_text: String::new(),
            engines: Vec::new(),
            exclude_engines: Vec::new(),
            exclude_site: None,
            exclude_terms: Vec::new(),
            date_before: None,
            date_after: None,
        }
    }

    /// Validation per spec §4.4 step 1: reject empty text.
    pub fn validate(&self) -> Result<(), crate::error::SearchError> {
        if self.text.trim().is_empty() {
            return Err(crate::error::SearchError::Validation);
        }
        Ok(())
    }
}

/// One hit, as produced by an adapter and then merged/ranked by the
/// Aggregator. `url` is the identity used for cross-adapter deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub content: String,
    pub engine: String,
    pub category: Category,
    pub score: f64,
    pub position: u32,
    pub thumbnail: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: Option<u64>,
    pub duration: Option<String>,
    pub relevance: f64,
    pub popularity: f64,
    pub duplicate_count: u32,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SearchResult {
    /// A minimal hit with the required identity fields set and every other
    /// field at its zero value. Adapters build on top of this rather than
    /// repeating the full field list per backend.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        engine: impl Into<String>,
        category: Category,
        position: u32,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: String::new(),
            engine: engine.into(),
            category,
            score: 0.0,
            position,
            thumbnail: None,
            author: None,
            published_at: None,
            view_count: None,
            duration: None,
            relevance: 0.0,
            popularity: 0.0,
            duplicate_count: 1,
            metadata: HashMap::new(),
        }
    }
}

/// The response envelope returned by `Aggregator::search` and stored by
/// value in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub category: Category,
    pub results: Vec<SearchResult>,
    pub total_count: usize,
    pub search_time: f64,
    pub engines_used: Vec<String>,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub sort: SortOrder,
}

impl SearchResults {
    /// `total_pages = ceil(total_count / per_page)`, floored at 1 — spec §3
    /// invariant and §8 testable property.
    pub fn compute_total_pages(total_count: usize, per_page: u32) -> u32 {
        if per_page == 0 {
            return 1;
        }
        let pages = (total_count as u64 + per_page as u64 - 1) / per_page as u64;
        std::cmp::max(1, pages as u32)
    }
}

/// Constant-after-construction descriptor for one adapter, per spec §3/§6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Lowercase identity, matched case-insensitively against include/exclude lists.
    pub name: String,
    pub display_name: String,
    pub enabled: bool,
    pub priority: i32,
    pub categories: Vec<Category>,
    pub timeout_secs: u64,
    pub max_results: usize,
    pub supports_tor: bool,
}

impl EngineConfig {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            enabled: true,
            priority: 0,
            categories: vec![Category::General],
            timeout_secs: 10,
            max_results: 100,
            supports_tor: false,
        }
    }

    /// Non-positive timeouts snap to the 10s default (spec §6).
    pub fn effective_timeout_secs(&self) -> u64 {
        if self.timeout_secs == 0 {
            10
        } else {
            self.timeout_secs
        }
    }

    /// Non-positive `max_results` snaps to the 100 default (spec §6).
    pub fn effective_max_results(&self) -> usize {
        if self.max_results == 0 {
            100
        } else {
            self.max_results
        }
    }

    pub fn supports_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// The value stored behind a fingerprint in the Result Cache: a deep copy
/// of a response plus its expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub results: SearchResults,
    pub expires_at: Instant,
}
