//! Application state shared across handlers.

use std::sync::Arc;

use techmart_store::{SharedStore, Store};

use crate::config::StorefrontConfig;
use crate::services::HistoryCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: SharedStore,
    history: HistoryCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, store: SharedStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                history: HistoryCache::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a shared handle to the store, for background tasks.
    #[must_use]
    pub fn shared_store(&self) -> SharedStore {
        Arc::clone(&self.inner.store)
    }

    /// Get a reference to the browsing history cache.
    #[must_use]
    pub fn history(&self) -> &HistoryCache {
        &self.inner.history
    }
}
