//! The two network-backed suggestion sources (spec §4.6, sources 1 and 2).
//! Each is independent and non-fatal: a request error or a malformed body
//! yields an empty vector rather than failing the whole lookup.

use metaseek_adapter::USER_AGENT;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

/// Source 1: an autocomplete endpoint shaped `[{"phrase": "..."}, ...]`
/// (DuckDuckGo's `ac/` endpoint is the reference implementation).
pub async fn fetch_phrase_shaped(client: &Client, query: &str) -> Vec<String> {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    let url = format!("https://duckduckgo.com/ac/?q={encoded}&type=list");
    let body: serde_json::Value = match client
        .get(url.as_str())
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .and_then(|r| r.error_for_status())
    {
        Ok(resp) => match resp.json().await {
            Ok(body) => body,
            Err(_) => return Vec::new(),
        },
        Err(_) => return Vec::new(),
    };
    body.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("phrase").and_then(|p| p.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Source 2: an autocomplete endpoint shaped `[query, [suggestions], ...]`
/// (MediaWiki's `action=opensearch` is the reference implementation; the
/// trailing description/url arrays it also returns are ignored).
pub async fn fetch_opensearch_shaped(client: &Client, query: &str) -> Vec<String> {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    let url = format!(
        "https://en.wikipedia.org/w/api.php?action=opensearch&format=json&limit=10&search={encoded}"
    );
    let body: serde_json::Value = match client
        .get(url.as_str())
        .header("User-Agent", USER_AGENT)
        .send()
        .await
        .and_then(|r| r.error_for_status())
    {
        Ok(resp) => match resp.json().await {
            Ok(body) => body,
            Err(_) => return Vec::new(),
        },
        Err(_) => return Vec::new(),
    };
    body.as_array()
        .and_then(|top| top.get(1))
        .and_then(|suggestions| suggestions.as_array())
        .map(|suggestions| {
            suggestions
                .iter()
                .filter_map(|s| s.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_encoding_escapes_spaces_and_keeps_alnum() {
        let encoded = utf8_percent_encode("rust lang", NON_ALPHANUMERIC).to_string();
        assert_eq!(encoded, "rust%20lang");
        let encoded = utf8_percent_encode("abc123", NON_ALPHANUMERIC).to_string();
        assert_eq!(encoded, "abc123");
    }
}
