//! DuckDuckGo's HTML-only endpoint (`html.duckduckgo.com/html/`), scraped
//! with `scraper`. Reference implementation for the "scrape HTML" code path
//! named in §4.3 — chosen because it needs no JS rendering and no API key.

use async_trait::async_trait;
use metaseek_adapter::{finalize_results, SearchContext, EngineAdapter, USER_AGENT};
use metaseek_core::{Category, EngineConfig, Outcome, Query, SearchError, SearchResult};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use scraper::{Html, Selector};

pub struct DuckDuckGoAdapter {
    config: EngineConfig,
    client: Client,
}

impl DuckDuckGoAdapter {
    pub fn new() -> Self {
        let mut config = EngineConfig::new("duckduckgo", "DuckDuckGo");
        config.priority = 9;
        config.categories = vec![Category::General];
        Self {
            config,
            client: Client::new(),
        }
    }
}

impl Default for DuckDuckGoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoAdapter {
    /// Re-serializes the query's parsed operators into DuckDuckGo's
    /// documented operator subset (spec §4.1's DuckDuckGo renderer). Falls
    /// back to the raw text when the aggregator hasn't parsed operators
    /// yet, so this adapter still works when exercised directly in tests.
    fn render_query(&self, query: &Query) -> String {
        match &query.operators {
            Some(ops) => metaseek_parser::render_duckduckgo(ops, &query.cleaned_text),
            None if !query.cleaned_text.is_empty() => query.cleaned_text.clone(),
            None => query.text.clone(),
        }
    }
}

#[async_trait]
impl EngineAdapter for DuckDuckGoAdapter {
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

    async fn search(&self, ctx: &SearchContext, query: &Query) -> Outcome<Vec<SearchResult>> {
        if !self.is_enabled() {
            return Err(SearchError::EngineDisabled(self.name().to_string()));
        }
        let text = self.render_query(query);
        let encoded = utf8_percent_encode(&text, NON_ALPHANUMERIC).to_string();
        let url = format!("https://html.duckduckgo.com/html/?q={encoded}");

        let response = tokio::select! {
            resp = self.client.get(&url).header("User-Agent", USER_AGENT).send() => resp,
            _ = ctx.cancellation().cancelled() => return Err(SearchError::Cancelled),
        };
        let response = response.map_err(|_| SearchError::EngineTimeout(self.name().to_string()))?;
        if !response.status().is_success() {
            return Err(SearchError::HttpStatus {
                engine: self.name().to_string(),
                status: response.status().as_u16(),
            });
        }
        // A body that can't even be read as text is not fatal (spec §7):
        // yield an empty slice rather than an error.
        let Ok(body) = response.text().await else {
            return Ok(Vec::new());
        };

        let results = parse_results_html(&body, self.name(), self.config.effective_max_results());
        Ok(finalize_results(results, self.name(), self.priority()))
    }
}

fn parse_results_html(html: &str, engine: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    // Selectors are infallible string literals; `unwrap` mirrors the crate's
    // own examples rather than threading a parse error through this hot path.
    let result_sel = Selector::parse(".result").unwrap();
    let title_sel = Selector::parse(".result__a").unwrap();
    let snippet_sel = Selector::parse(".result__snippet").unwrap();

    let mut results = Vec::new();
    for node in document.select(&result_sel).take(limit) {
        let Some(title_el) = node.select(&title_sel).next() else {
            continue;
        };
        let title: String = title_el.text().collect();
        let Some(href) = title_el.value().attr("href") else {
            continue;
        };
        let snippet: String = node
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect())
            .unwrap_or_default();

        let mut result = SearchResult::new(
            href.to_string(),
            title.trim().to_string(),
            engine,
            Category::General,
            0,
        );
        result.content = snippet.trim().to_string();
        results.push(result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_result_blocks_from_static_html() {
        let html = r#"
            <div class="result">
                <a class="result__a" href="https://example.com/a">Example A</a>
                <a class="result__snippet">First snippet</a>
            </div>
            <div class="result">
                <a class="result__a" href="https://example.com/b">Example B</a>
                <a class="result__snippet">Second snippet</a>
            </div>
        "#;
        let results = parse_results_html(html, "duckduckgo", 100);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://example.com/a");
        assert_eq!(results[0].title, "Example A");
        assert_eq!(results[0].content, "First snippet");
    }

    #[test]
    fn respects_the_result_limit() {
        let html = r#"
            <div class="result"><a class="result__a" href="https://a">A</a></div>
            <div class="result"><a class="result__a" href="https://b">B</a></div>
            <div class="result"><a class="result__a" href="https://c">C</a></div>
        "#;
        let results = parse_results_html(html, "duckduckgo", 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn skips_result_blocks_missing_a_title_link() {
        let html = r#"<div class="result"><span>no link here</span></div>"#;
        let results = parse_results_html(html, "duckduckgo", 100);
        assert!(results.is_empty());
    }

    #[test]
    fn render_query_drops_verticals_the_duckduckgo_dialect_does_not_support() {
        let adapter = DuckDuckGoAdapter::new();
        let (ops, cleaned) = metaseek_parser::parse("rust weather:paris site:example.com");
        let mut query = Query::new("rust weather:paris site:example.com");
        query.cleaned_text = cleaned;
        query.operators = Some(ops);
        let rendered = adapter.render_query(&query);
        assert!(!rendered.contains("weather:"));
        assert!(rendered.contains("site:example.com"));
    }
}
