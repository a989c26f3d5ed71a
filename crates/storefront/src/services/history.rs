//! Browsing history.
//!
//! Histories are kept in memory per viewer (a [`CartOwner`]) and forgotten
//! after 30 days without activity.

use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;

use techmart_core::CartOwner;
use techmart_core::ProductId;
use techmart_core::recommend::BrowsingHistory;

const MAX_VIEWERS: u64 = 100_000;
const IDLE_EXPIRY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Per-viewer browsing histories.
#[derive(Clone)]
pub struct HistoryCache {
    cache: Cache<String, BrowsingHistory>,
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_VIEWERS)
            .time_to_idle(IDLE_EXPIRY)
            .build();
        Self { cache }
    }

    /// Record a product view.
    pub async fn record(&self, viewer: &CartOwner, product_id: ProductId, at: DateTime<Utc>) {
        self.cache
            .entry(viewer.storage_key())
            .and_upsert_with(|existing| {
                let mut history = existing.map(|e| e.into_value()).unwrap_or_default();
                history.record(product_id, at);
                std::future::ready(history)
            })
            .await;
    }

    /// The viewer's history, empty when nothing was recorded.
    pub async fn get(&self, viewer: &CartOwner) -> BrowsingHistory {
        self.cache
            .get(&viewer.storage_key())
            .await
            .unwrap_or_default()
    }
}
