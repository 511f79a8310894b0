//! # metaseek-parser
//!
//! The operator parser (spec §4.1): turns a raw query string into an
//! `Operators` set plus the cleaned free-text remainder, and renders that
//! pair back into the four upstream dialects the aggregator needs when it
//! builds a per-adapter request.

pub mod parse;
pub mod render;

pub use parse::parse;
pub use render::{render_basic, render_bing, render_duckduckgo, render_superset};
