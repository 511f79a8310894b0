//! Wikipedia's `action=opensearch` API: stable, unauthenticated, JSON.
//! Reference implementation for the "parse JSON" code path named in §4.3.

use async_trait::async_trait;
use metaseek_adapter::{finalize_results, SearchContext, EngineAdapter, USER_AGENT};
use metaseek_core::{Category, EngineConfig, Outcome, Query, SearchError, SearchResult};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

pub struct WikipediaAdapter {
    config: EngineConfig,
    client: Client,
}

impl WikipediaAdapter {
    pub fn new() -> Self {
        let mut config = EngineConfig::new("wikipedia", "Wikipedia");
        config.priority = 8;
        config.categories = vec![Category::General, Category::Science];
        Self {
            config,
            client: Client::new(),
        }
    }
}

impl Default for WikipediaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WikipediaAdapter {
    /// The opensearch API has no operator syntax of its own, so this uses
    /// the parser's operator-stripped basic renderer (spec §4.1) — cleaned
    /// text plus exact phrases only.
    fn render_query(&self, query: &Query) -> String {
        match &query.operators {
            Some(ops) => metaseek_parser::render_basic(ops, &query.cleaned_text),
            None if !query.cleaned_text.is_empty() => query.cleaned_text.clone(),
            None => query.text.clone(),
        }
    }
}

#[async_trait]
impl EngineAdapter for WikipediaAdapter {
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
        let url = format!(
            "https://en.wikipedia.org/w/api.php?action=opensearch&format=json&limit={}&search={}",
            self.config.effective_max_results().min(20),
            encoded,
        );

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
        // Malformed JSON is not fatal to the search (spec §7): upstream
        // response shapes drift without notice, so this yields an empty
        // slice rather than an error.
        let Ok(body) = response.json::<serde_json::Value>().await else {
            return Ok(Vec::new());
        };

        let results = parse_opensearch_json(&body, self.name(), query.category);
        Ok(finalize_results(results, self.name(), self.priority()))
    }
}

/// Maps the opensearch API's positional-array response
/// (`[query, [titles], [descriptions], [urls]]`) onto `SearchResult`,
/// tagging every hit with the requesting query's category (spec §3:
/// "Adapters return results whose `category` matches the request's
/// category").
fn parse_opensearch_json(body: &serde_json::Value, engine: &str, category: Category) -> Vec<SearchResult> {
    let titles = body
        .get(1)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    let urls = body
        .get(3)
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    titles
        .iter()
        .zip(urls.iter())
        .filter_map(|(title, link)| {
            let title = title.as_str()?;
            let link = link.as_str()?;
            let mut result = SearchResult::new(link, title, engine, category, 0);
            result.content = format!("Wikipedia article: {title}");
            Some(result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_engine_rejects_before_any_network_call() {
        let mut adapter = WikipediaAdapter::new();
        adapter.config.enabled = false;
        assert!(!adapter.is_enabled());
    }

    #[test]
    fn supports_general_and_science_not_videos() {
        let adapter = WikipediaAdapter::new();
        assert!(adapter.supports_category(Category::General));
        assert!(adapter.supports_category(Category::Science));
        assert!(!adapter.supports_category(Category::Videos));
    }

    #[test]
    fn parsed_results_are_tagged_with_the_requested_category() {
        let body = serde_json::json!([
            "rust",
            ["Rust (programming language)"],
            [""],
            ["https://en.wikipedia.org/wiki/Rust_(programming_language)"],
        ]);
        let results = parse_opensearch_json(&body, "wikipedia", Category::Science);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, Category::Science);
    }
}
