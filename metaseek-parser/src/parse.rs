//! Operator extraction (spec §4.1).
//!
//! Parsing is total: every input string, however malformed, produces an
//! `Operators` value and a cleaned-text `String`. Extraction proceeds in
//! three passes over the input:
//!
//! 1. exact phrases (`"..."`) are pulled out first and the quotes removed,
//! 2. the remainder is tokenized on whitespace and each token is checked
//!    against the colon-prefixed operator vocabulary, then against the
//!    bare `-term` exclusion and the free-standing `OR`/`AND` flags,
//! 3. surviving tokens are rejoined with single spaces and trimmed.
//!
//! `*` sets the wildcard flag wherever it appears in the original input; it
//! is not itself removed from the cleaned text.

use chrono::NaiveDate;
use metaseek_core::types::{DateRange, NumericRange, Operators};
use regex::Regex;
use std::sync::OnceLock;

fn phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]*)""#).unwrap())
}

fn numeric_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$?(\d+(?:\.\d+)?)\.\.\$?(\d+(?:\.\d+)?)$").unwrap())
}

/// Parse a raw query string into its structured operator set and the
/// cleaned free-text remainder.
pub fn parse(input: &str) -> (Operators, String) {
    let mut ops = Operators::default();
    ops.has_wildcard = input.contains('*');

    // Pass 1: exact phrases, extracted and stripped first so their contents
    // never get re-tokenized as operators.
    for caps in phrase_re().captures_iter(input) {
        ops.exact_phrases.push(caps[1].to_string());
    }
    let without_phrases = phrase_re().replace_all(input, " ").to_string();

    // Pass 2: tokenize and classify.
    let mut cleaned_tokens: Vec<String> = Vec::new();
    for tok in without_phrases.split_whitespace() {
        if tok == "OR" {
            ops.has_or = true;
            continue;
        }
        if tok == "AND" {
            ops.has_and = true;
            continue;
        }
        if numeric_range_re().is_match(tok) {
            if let Some(caps) = numeric_range_re().captures(tok) {
                if let (Ok(low), Ok(high)) =
                    (caps[1].parse::<f64>(), caps[2].parse::<f64>())
                {
                    ops.numeric_range = Some(NumericRange { low, high });
                }
            }
            continue;
        }
        if let Some(colon) = tok.find(':') {
            let key = tok[..colon].to_ascii_lowercase();
            let value = &tok[colon + 1..];
            if !value.is_empty() && apply_operator(&mut ops, &key, value) {
                continue;
            }
            // Unrecognized colon token (e.g. a bare URL) falls through as text.
        }
        if tok.len() > 1 && tok.starts_with('-') && !tok[1..].contains(':') {
            ops.excluded_terms.push(tok[1..].to_string());
            continue;
        }
        cleaned_tokens.push(tok.to_string());
    }

    let cleaned = cleaned_tokens.join(" ").trim().to_string();
    (ops, cleaned)
}

/// Applies one recognized `key:value` operator token to `ops`. Returns
/// `false` for an unrecognized key so the caller can fall back to treating
/// the token as plain text.
fn apply_operator(ops: &mut Operators, key: &str, value: &str) -> bool {
    match key {
        "-site" => ops.exclude_site.push(value.to_string()),
        "site" => {
            ops.site_all.push(value.to_string());
            if ops.site.is_none() {
                ops.site = Some(value.to_string());
            }
        }
        "filetype" | "ext" => ops.filetype.push(value.to_string()),
        "inurl" => ops.inurl = Some(value.to_string()),
        "allinurl" => ops.all_in_url = Some(value.to_string()),
        "intitle" => ops.intitle = Some(value.to_string()),
        "allintitle" => ops.all_in_title = Some(value.to_string()),
        "intext" => ops.intext = Some(value.to_string()),
        "allintext" => ops.all_in_text = Some(value.to_string()),
        "inanchor" => ops.inanchor = Some(value.to_string()),
        "allinanchor" => ops.all_in_anchor = Some(value.to_string()),
        "related" => ops.related = Some(value.to_string()),
        "cache" => ops.cache = Some(value.to_string()),
        "info" => ops.info = Some(value.to_string()),
        "define" => ops.define = Some(value.to_string()),
        "weather" => ops.weather = Some(value.to_string()),
        "stocks" => ops.stocks = Some(value.to_string()),
        "map" => ops.map = Some(value.to_string()),
        "movie" => ops.movie = Some(value.to_string()),
        "source" => ops.source = Some(value.to_string()),
        "loc" | "location" => ops.location = Some(value.to_string()),
        "lang" => ops.language = Some(value.to_string()),
        "daterange" => {
            if let Some((from, to)) = value.split_once('-') {
                if let (Ok(from), Ok(to)) = (from.parse::<i64>(), to.parse::<i64>()) {
                    ops.daterange = Some(DateRange { from, to });
                }
            }
        }
        "before" => {
            if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                ops.before = Some(date);
            }
        }
        "after" => {
            if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                ops.after = Some(date);
            }
        }
        _ => return false,
    }
    true
}
