//! Adapter-specific re-serialization (spec §4.1): four renderers that
//! recompose a parsed `Operators` set back into the dialect a particular
//! upstream accepts. Rendering never fails — an operator the target
//! dialect does not support is simply omitted.

use metaseek_core::types::Operators;

fn push_phrases(buf: &mut Vec<String>, ops: &Operators) {
    for phrase in &ops.exact_phrases {
        buf.push(format!("\"{phrase}\""));
    }
}

fn push_excluded(buf: &mut Vec<String>, ops: &Operators) {
    for term in &ops.excluded_terms {
        buf.push(format!("-{term}"));
    }
}

/// The common superset dialect: every operator this parser recognizes,
/// re-serialized in its original colon-prefixed form.
pub fn render_superset(ops: &Operators, cleaned_text: &str) -> String {
    let mut parts = Vec::new();
    if !cleaned_text.is_empty() {
        parts.push(cleaned_text.to_string());
    }
    push_phrases(&mut parts, ops);
    if let Some(site) = &ops.site {
        parts.push(format!("site:{site}"));
    }
    for site in &ops.exclude_site {
        parts.push(format!("-site:{site}"));
    }
    for ft in &ops.filetype {
        parts.push(format!("filetype:{ft}"));
    }
    if let Some(v) = &ops.inurl {
        parts.push(format!("inurl:{v}"));
    }
    if let Some(v) = &ops.all_in_url {
        parts.push(format!("allinurl:{v}"));
    }
    if let Some(v) = &ops.intitle {
        parts.push(format!("intitle:{v}"));
    }
    if let Some(v) = &ops.all_in_title {
        parts.push(format!("allintitle:{v}"));
    }
    if let Some(v) = &ops.intext {
        parts.push(format!("intext:{v}"));
    }
    if let Some(v) = &ops.all_in_text {
        parts.push(format!("allintext:{v}"));
    }
    if let Some(v) = &ops.inanchor {
        parts.push(format!("inanchor:{v}"));
    }
    if let Some(v) = &ops.all_in_anchor {
        parts.push(format!("allinanchor:{v}"));
    }
    if let Some(v) = &ops.before {
        parts.push(format!("before:{v}"));
    }
    if let Some(v) = &ops.after {
        parts.push(format!("after:{v}"));
    }
    if let Some(r) = &ops.daterange {
        parts.push(format!("daterange:{}-{}", r.from, r.to));
    }
    if let Some(v) = &ops.define {
        parts.push(format!("define:{v}"));
    }
    if let Some(v) = &ops.weather {
        parts.push(format!("weather:{v}"));
    }
    if let Some(v) = &ops.stocks {
        parts.push(format!("stocks:{v}"));
    }
    if let Some(v) = &ops.map {
        parts.push(format!("map:{v}"));
    }
    if let Some(v) = &ops.movie {
        parts.push(format!("movie:{v}"));
    }
    if let Some(v) = &ops.source {
        parts.push(format!("source:{v}"));
    }
    if let Some(v) = &ops.location {
        parts.push(format!("loc:{v}"));
    }
    if let Some(v) = &ops.language {
        parts.push(format!("lang:{v}"));
    }
    push_excluded(&mut parts, ops);
    if let Some(n) = &ops.numeric_range {
        parts.push(format!("{}..{}", n.low, n.high));
    }
    if ops.has_or {
        parts.push("OR".to_string());
    }
    if ops.has_and {
        parts.push("AND".to_string());
    }
    parts.join(" ")
}

/// DuckDuckGo's documented operator subset: `site:`, `-site:`, `filetype:`,
/// `intitle:`, `inurl:`, exact phrases, and bare `-term` exclusions.
/// Verticals (`define:`, `weather:`, ...) are DuckDuckGo bang syntax, not
/// operators, so they are intentionally dropped here.
pub fn render_duckduckgo(ops: &Operators, cleaned_text: &str) -> String {
    let mut parts = Vec::new();
    if !cleaned_text.is_empty() {
        parts.push(cleaned_text.to_string());
    }
    push_phrases(&mut parts, ops);
    if let Some(site) = &ops.site {
        parts.push(format!("site:{site}"));
    }
    for site in &ops.exclude_site {
        parts.push(format!("-site:{site}"));
    }
    for ft in &ops.filetype {
        parts.push(format!("filetype:{ft}"));
    }
    if let Some(v) = &ops.intitle {
        parts.push(format!("intitle:{v}"));
    }
    if let Some(v) = &ops.inurl {
        parts.push(format!("inurl:{v}"));
    }
    push_excluded(&mut parts, ops);
    parts.join(" ")
}

/// Bing's documented operator subset: `site:`, `filetype:`, `intitle:`,
/// `inbody:` (mapped from `intext:`), `loc:`, `language:`, exact phrases,
/// and `-term` exclusions.
pub fn render_bing(ops: &Operators, cleaned_text: &str) -> String {
    let mut parts = Vec::new();
    if !cleaned_text.is_empty() {
        parts.push(cleaned_text.to_string());
    }
    push_phrases(&mut parts, ops);
    if let Some(site) = &ops.site {
        parts.push(format!("site:{site}"));
    }
    for ft in &ops.filetype {
        parts.push(format!("filetype:{ft}"));
    }
    if let Some(v) = &ops.intitle {
        parts.push(format!("intitle:{v}"));
    }
    if let Some(v) = &ops.intext {
        parts.push(format!("inbody:{v}"));
    }
    if let Some(v) = &ops.location {
        parts.push(format!("loc:{v}"));
    }
    if let Some(v) = &ops.language {
        parts.push(format!("language:{v}"));
    }
    push_excluded(&mut parts, ops);
    parts.join(" ")
}

/// The operator-stripped basic form: cleaned text plus exact phrases only.
/// Used for backends with no operator support at all.
pub fn render_basic(ops: &Operators, cleaned_text: &str) -> String {
    let mut parts = Vec::new();
    if !cleaned_text.is_empty() {
        parts.push(cleaned_text.to_string());
    }
    push_phrases(&mut parts, ops);
    parts.join(" ")
}
