//! Application state shared across handlers.

use std::sync::Arc;

use techmart_store::{SharedStore, Store};

use crate::config::AdminConfig;
use crate::services::AnalyticsCache;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: SharedStore,
    analytics: AnalyticsCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, store: SharedStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                analytics: AnalyticsCache::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Cached analytics report.
    #[must_use]
    pub fn analytics(&self) -> &AnalyticsCache {
        &self.inner.analytics
    }
}
