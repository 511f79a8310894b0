//! # metaseek-related
//!
//! The Related-Query Provider (spec §4.6): independent of the Aggregator,
//! with its own TTL cache and three concurrent suggestion sources merged on
//! a miss. Reaping is opportunistic — it runs on a miss, not on a timer, so
//! this crate spawns nothing in the background.

mod sources;
mod variations;

use metaseek_adapter::SearchContext;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

const DEFAULT_LIMIT: usize = 8;
const CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct RelatedQueryProvider {
    client: Client,
    cache: Arc<RwLock<HashMap<String, (Vec<String>, Instant)>>>,
}

impl Default for RelatedQueryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RelatedQueryProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Empty `query` returns empty with no cache interaction. `limit <= 0`
    /// snaps to 8. Cache key is the lowercased, trimmed query.
    pub async fn get_related(
        &self,
        ctx: &SearchContext,
        query: &str,
        limit: i64,
    ) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let limit = if limit <= 0 { DEFAULT_LIMIT } else { limit as usize };
        let key = query.trim().to_ascii_lowercase();

        if let Some(cached) = self.cached(&key).await {
            return cached.into_iter().take(limit).collect();
        }

        // Opportunistic reap: only a miss triggers a sweep over the whole map.
        self.reap_expired().await;

        let merged = self.fetch_and_merge(ctx, query, &key).await;
        self.cache
            .write()
            .await
            .insert(key, (merged.clone(), Instant::now() + CACHE_TTL));
        merged.into_iter().take(limit).collect()
    }

    async fn cached(&self, key: &str) -> Option<Vec<String>> {
        let cache = self.cache.read().await;
        cache
            .get(key)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(suggestions, _)| suggestions.clone())
    }

    async fn reap_expired(&self) {
        let now = Instant::now();
        self.cache.write().await.retain(|_, (_, expires_at)| *expires_at > now);
    }

    /// Runs the three sources concurrently over an mpsc channel (capacity 1
    /// is the closest legal analogue tokio offers to an unbuffered
    /// rendezvous channel), waits for all three via a completion barrier,
    /// then dedupes case-insensitively and drops the query itself.
    async fn fetch_and_merge(&self, ctx: &SearchContext, query: &str, key: &str) -> Vec<String> {
        // Capacity 1 is the closest legal analogue tokio's mpsc offers to an
        // unbuffered rendezvous channel (it refuses capacity 0). A receiver
        // task drains it concurrently so a full buffer never stalls a
        // producer while the completion barrier below is waiting on them.
        let (tx, mut rx) = mpsc::channel::<Vec<String>>(1);
        let collector = tokio::spawn(async move {
            let mut merged = Vec::new();
            while let Some(batch) = rx.recv().await {
                merged.extend(batch);
            }
            merged
        });

        let client_a = self.client.clone();
        let client_b = self.client.clone();
        let query_owned = query.to_string();
        let query_owned_b = query.to_string();
        let query_owned_c = query.to_string();
        let tx_a = tx.clone();
        let tx_b = tx.clone();
        let tx_c = tx.clone();
        let cancel_a = ctx.cancellation().clone();
        let cancel_b = ctx.cancellation().clone();

        let task_a = tokio::spawn(async move {
            let result = tokio::select! {
                r = sources::fetch_phrase_shaped(&client_a, &query_owned) => r,
                _ = cancel_a.cancelled() => Vec::new(),
            };
            let _ = tx_a.send(result).await;
        });
        let task_b = tokio::spawn(async move {
            let result = tokio::select! {
                r = sources::fetch_opensearch_shaped(&client_b, &query_owned_b) => r,
                _ = cancel_b.cancelled() => Vec::new(),
            };
            let _ = tx_b.send(result).await;
        });
        let task_c = tokio::spawn(async move {
            let _ = tx_c.send(variations::generate(&query_owned_c)).await;
        });
        // Drop the provider's own sender so the channel closes once the
        // three producer tasks (and their clones) finish.
        drop(tx);

        // Completion barrier: wait for every producer before trusting the
        // collector has seen everything it's going to see.
        let _ = tokio::join!(task_a, task_b, task_c);
        let merged = collector.await.unwrap_or_default();

        let mut seen = std::collections::HashSet::new();
        seen.insert(key.to_string());
        let deduped: Vec<String> = merged
            .into_iter()
            .filter(|s| seen.insert(s.to_ascii_lowercase()))
            .collect();
        debug!(query, count = deduped.len(), "related queries merged");
        deduped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_query_returns_empty_without_touching_network() {
        let provider = RelatedQueryProvider::new();
        let ctx = SearchContext::unbounded();
        assert!(provider.get_related(&ctx, "", 5).await.is_empty());
        assert!(provider.get_related(&ctx, "   ", 5).await.is_empty());
    }

    #[tokio::test]
    async fn non_positive_limit_snaps_to_eight() {
        let provider = RelatedQueryProvider::new();
        let ctx = SearchContext::unbounded();
        // Variation generator alone produces well over 8 candidates for a
        // single word query, so with the network sources failing offline
        // the result is still capped at the default limit.
        let related = provider.get_related(&ctx, "rust", 0).await;
        assert!(related.len() <= DEFAULT_LIMIT);
    }

    #[tokio::test]
    async fn variation_suggestions_never_equal_the_query_itself() {
        let provider = RelatedQueryProvider::new();
        let ctx = SearchContext::unbounded();
        let related = provider.get_related(&ctx, "golang", 20).await;
        assert!(!related.iter().any(|s| s.eq_ignore_ascii_case("golang")));
    }
}
