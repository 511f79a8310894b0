//! # metaseek-registry
//!
//! The Backend Registry (spec §4.2): a reader-writer map from adapter name
//! to adapter, with many readers during a search and an occasional writer
//! at boot or reconfiguration. Keys are stored lowercase so every lookup is
//! case-insensitive without the caller having to think about it.

use metaseek_adapter::EngineAdapter;
use metaseek_core::Category;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// The live set of registered adapters, shared via `Arc` by the Aggregator.
#[derive(Clone, Default)]
pub struct Registry {
    engines: Arc<RwLock<HashMap<String, Arc<dyn EngineAdapter>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            engines: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Adds or replaces the adapter under `adapter.name()`, lowercased.
    pub async fn register(&self, adapter: Arc<dyn EngineAdapter>) {
        let key = adapter.name().to_ascii_lowercase();
        debug!(engine = %key, "registering adapter");
        self.engines.write().await.insert(key, adapter);
    }

    /// Case-insensitive lookup by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn EngineAdapter>> {
        self.engines
            .read()
            .await
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    pub async fn get_all(&self) -> Vec<Arc<dyn EngineAdapter>> {
        self.engines.read().await.values().cloned().collect()
    }

    /// Every registered adapter whose `is_enabled()` currently returns true.
    /// The enabled flag is read live from each adapter, not cached at
    /// registration time, so an adapter that toggles itself is reflected
    /// immediately on the next call.
    pub async fn get_enabled(&self) -> Vec<Arc<dyn EngineAdapter>> {
        self.engines
            .read()
            .await
            .values()
            .filter(|a| a.is_enabled())
            .cloned()
            .collect()
    }

    /// Enabled adapters that support `category`.
    pub async fn get_for_category(&self, category: Category) -> Vec<Arc<dyn EngineAdapter>> {
        self.engines
            .read()
            .await
            .values()
            .filter(|a| a.is_enabled() && a.supports_category(category))
            .cloned()
            .collect()
    }

    /// Empty `names` is `GetEnabled`; otherwise, enabled adapters whose name
    /// matches (case-insensitively) any entry in `names`, skipping any name
    /// that isn't registered rather than failing the whole batch.
    pub async fn get_by_names(&self, names: &[String]) -> Vec<Arc<dyn EngineAdapter>> {
        if names.is_empty() {
            return self.get_enabled().await;
        }
        let wanted: std::collections::HashSet<String> =
            names.iter().map(|n| n.to_ascii_lowercase()).collect();
        self.engines
            .read()
            .await
            .values()
            .filter(|a| a.is_enabled() && wanted.contains(&a.name().to_ascii_lowercase()))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.engines.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.engines.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use metaseek_adapter::SearchContext;
    use metaseek_core::{EngineConfig, Outcome, Query, SearchResult};

    struct StubAdapter {
        config: EngineConfig,
    }

    #[async_trait]
    impl EngineAdapter for StubAdapter {
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
        async fn search(&self, _ctx: &SearchContext, _query: &Query) -> Outcome<Vec<SearchResult>> {
            Ok(Vec::new())
        }
    }

    fn stub(name: &str, enabled: bool) -> Arc<dyn EngineAdapter> {
        let mut config = EngineConfig::new(name, name);
        config.enabled = enabled;
        Arc::new(StubAdapter { config })
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let registry = Registry::new();
        registry.register(stub("Wikipedia", true)).await;
        assert!(registry.get("WIKIPEDIA").await.is_some());
        assert!(registry.get("wikipedia").await.is_some());
    }

    #[tokio::test]
    async fn get_enabled_excludes_disabled_adapters() {
        let registry = Registry::new();
        registry.register(stub("a", true)).await;
        registry.register(stub("b", false)).await;
        let enabled = registry.get_enabled().await;
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].name(), "a");
    }

    #[tokio::test]
    async fn get_by_names_skips_unregistered_and_disabled() {
        let registry = Registry::new();
        registry.register(stub("a", true)).await;
        registry.register(stub("b", false)).await;
        let found = registry
            .get_by_names(&["A".to_string(), "B".to_string(), "missing".to_string()])
            .await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "a");
    }

    #[tokio::test]
    async fn get_by_names_empty_list_falls_back_to_get_enabled() {
        let registry = Registry::new();
        registry.register(stub("a", true)).await;
        registry.register(stub("b", false)).await;
        let found = registry.get_by_names(&[]).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "a");
    }
}
