//! The Hacker News Algolia search API: JSON, stable, no API key required.
//! A second reference implementation of the "parse JSON" code path, chosen
//! for its different response shape (a flat `hits` array) from Wikipedia's
//! positional arrays.

use async_trait::async_trait;
use chrono::DateTime;
use metaseek_adapter::{finalize_results, SearchContext, EngineAdapter, USER_AGENT};
use metaseek_core::{Category, EngineConfig, Outcome, Query, SearchError, SearchResult};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

pub struct HackerNewsAdapter {
    config: EngineConfig,
    client: Client,
}

impl HackerNewsAdapter {
    pub fn new() -> Self {
        let mut config = EngineConfig::new("hackernews", "Hacker News");
        config.priority = 6;
        config.categories = vec![Category::News, Category::It, Category::Social];
        Self {
            config,
            client: Client::new(),
        }
    }
}

impl Default for HackerNewsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HackerNewsAdapter {
    /// Algolia's search API has no operator syntax of its own, so this uses
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
impl EngineAdapter for HackerNewsAdapter {
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
            "https://hn.algolia.com/api/v1/search?query={}&hitsPerPage={}",
            encoded,
            self.config.effective_max_results().min(50),
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

        let results = parse_algolia_json(&body, self.name(), query.category);
        Ok(finalize_results(results, self.name(), self.priority()))
    }
}

/// Maps the Algolia search API's flat `hits` array onto `SearchResult`,
/// tagging every hit with the requesting query's category (spec §3:
/// "Adapters return results whose `category` matches the request's
/// category").
fn parse_algolia_json(body: &serde_json::Value, engine: &str, category: Category) -> Vec<SearchResult> {
    let hits = body.get("hits").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    hits.iter()
        .filter_map(|hit| {
            let title = hit.get("title").and_then(|v| v.as_str())?;
            let url = hit
                .get("url")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "https://news.ycombinator.com/item?id={}",
                        hit.get("objectID").and_then(|v| v.as_str()).unwrap_or("")
                    )
                });
            let mut result = SearchResult::new(url, title, engine, category, 0);
            result.author = hit
                .get("author")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            result.view_count = hit.get("points").and_then(|v| v.as_u64());
            result.published_at = hit
                .get("created_at")
                .and_then(|v| v.as_str())
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&chrono::Utc));
            Some(result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_news_it_and_social_not_maps() {
        let adapter = HackerNewsAdapter::new();
        assert!(adapter.supports_category(Category::News));
        assert!(adapter.supports_category(Category::It));
        assert!(!adapter.supports_category(Category::Maps));
    }

    #[test]
    fn parsed_results_are_tagged_with_the_requested_category() {
        let body = serde_json::json!({
            "hits": [
                {
                    "title": "Show HN: a thing",
                    "url": "https://example.com/thing",
                    "author": "someone",
                    "points": 42,
                    "created_at": "2024-01-01T00:00:00Z",
                },
            ],
        });
        let results = parse_algolia_json(&body, "hackernews", Category::It);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, Category::It);
    }
}
