//! # metaseek-engines
//!
//! Reference `EngineAdapter` implementations: two JSON backends (Wikipedia,
//! Hacker News), one HTML-scraping backend (DuckDuckGo), and an in-process
//! `MockAdapter` for deterministic aggregator tests. This is a conformance
//! fixture set, not the full production backend roster — see
//! `DESIGN.md` for why that roster is out of scope here.

mod duckduckgo;
mod hackernews;
mod mock;
mod wikipedia;

pub use duckduckgo::DuckDuckGoAdapter;
pub use hackernews::HackerNewsAdapter;
pub use mock::MockAdapter;
pub use wikipedia::WikipediaAdapter;
