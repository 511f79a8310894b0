//! # metaseek-cache
//!
//! The Result Cache (spec §4.5): a bounded, TTL'd mapping from query
//! fingerprint to a deep copy of a previous response. Get is a reader;
//! Set/Delete/Clear and the background reaper are writers; hit/miss
//! counters live behind their own lock so a read-only `get` never has to
//! take the items map's write side just to bump a number.

pub mod fingerprint;

pub use fingerprint::fingerprint;

use metaseek_core::{CacheEntry, SearchResults};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_CAPACITY: usize = 1000;
const REAPER_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// The shared, cloneable handle to one cache instance. Cloning shares the
/// underlying maps via `Arc` — every clone observes the same state.
#[derive(Clone)]
pub struct ResultCache {
    items: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<RwLock<CacheStats>>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    /// Non-positive `ttl_secs`/`capacity` snap to the spec defaults (5
    /// minutes, 1000 entries).
    pub fn new(ttl_secs: u64, capacity: usize) -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
            ttl: Duration::from_secs(if ttl_secs == 0 { DEFAULT_TTL_SECS } else { ttl_secs }),
            capacity: if capacity == 0 { DEFAULT_CAPACITY } else { capacity },
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_TTL_SECS, DEFAULT_CAPACITY)
    }

    /// A deep copy of the cached `SearchResults` for `key`, or `None` on a
    /// miss (including a logically-expired-but-not-yet-reaped entry).
    pub async fn get(&self, key: &str) -> Option<SearchResults> {
        let hit = {
            let items = self.items.read().await;
            items
                .get(key)
                .filter(|entry| entry.expires_at > Instant::now())
                .map(|entry| entry.results.clone())
        };
        let mut stats = self.stats.write().await;
        match &hit {
            Some(_) => stats.hits += 1,
            None => stats.misses += 1,
        }
        hit
    }

    /// Inserts or overwrites `key`. On a capacity breach, evicts the entry
    /// whose `expires_at` is earliest — not an LRU pass over access order.
    pub async fn set(&self, key: String, results: SearchResults) {
        let mut items = self.items.write().await;
        if !items.contains_key(&key) && items.len() >= self.capacity {
            if let Some(victim) = items
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone())
            {
                debug!(evicted = %victim, "result cache capacity breach");
                items.remove(&victim);
            }
        }
        items.insert(
            key,
            CacheEntry {
                results,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub async fn delete(&self, key: &str) {
        self.items.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    pub async fn size(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn stats(&self) -> CacheStats {
        *self.stats.read().await
    }

    /// Removes every entry whose `expires_at` has passed. Called by the
    /// background reaper every 60 seconds; exposed directly for tests.
    pub async fn reap_expired(&self) {
        let now = Instant::now();
        let mut items = self.items.write().await;
        items.retain(|_, entry| entry.expires_at > now);
    }

    /// Spawns the background reaper task. The returned handle is owned by
    /// the caller (typically the aggregator's top-level setup) so it can be
    /// aborted on shutdown.
    pub fn spawn_reaper(&self) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(REAPER_INTERVAL_SECS));
            loop {
                interval.tick().await;
                cache.reap_expired().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaseek_core::{Category, SortOrder};

    fn sample_results() -> SearchResults {
        SearchResults {
            query: "rust".to_string(),
            category: Category::General,
            results: Vec::new(),
            total_count: 0,
            search_time: 0.01,
            engines_used: Vec::new(),
            page: 1,
            per_page: 10,
            total_pages: 1,
            sort: SortOrder::Relevance,
        }
    }

    #[tokio::test]
    async fn miss_then_hit_updates_stats() {
        let cache = ResultCache::with_defaults();
        assert!(cache.get("k").await.is_none());
        cache.set("k".to_string(), sample_results()).await;
        assert!(cache.get("k").await.is_some());
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn zero_ttl_snaps_to_default_and_entry_survives_immediately() {
        let cache = ResultCache::new(0, 0);
        cache.set("k".to_string(), sample_results()).await;
        assert!(cache.get("k").await.is_some());
    }

    #[tokio::test]
    async fn capacity_breach_evicts_earliest_expiry() {
        let cache = ResultCache::new(300, 2);
        cache.set("old".to_string(), sample_results()).await;
        // Force "old" to expire sooner than anything inserted after it by
        // reinserting with a cache of ttl 1s just for this key's baseline,
        // then a longer-lived second key, then a third to trigger eviction.
        let short = ResultCache::new(1, 2);
        short.set("old".to_string(), sample_results()).await;
        short.set("new".to_string(), sample_results()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        short.set("newest".to_string(), sample_results()).await;
        assert_eq!(short.size().await, 2);
    }

    #[tokio::test]
    async fn reap_removes_expired_entries() {
        let cache = ResultCache::new(0, 1000);
        // Manually craft an already-expired entry to avoid sleeping a full TTL.
        cache
            .items
            .write()
            .await
            .insert(
                "expired".to_string(),
                CacheEntry {
                    results: sample_results(),
                    expires_at: Instant::now() - Duration::from_secs(1),
                },
            );
        cache.reap_expired().await;
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let cache = ResultCache::with_defaults();
        cache.set("k".to_string(), sample_results()).await;
        cache.clear().await;
        assert_eq!(cache.size().await, 0);
    }
}
