//! Store statistics and the cached analytics report.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::instrument;

use techmart_core::analytics::{AnalyticsReport, StoreStats, analytics_report, store_stats};
use techmart_core::order::OrderQuery;
use techmart_store::{Store, StoreResult};

const REPORT_TTL: Duration = Duration::from_secs(60);

/// Caches the analytics report for [`REPORT_TTL`].
///
/// Admin writes call [`AnalyticsCache::invalidate`] so the next read is fresh.
/// Reports are keyed by an invalidation generation: a rebuild that was
/// already running when a write landed stores its result under a generation
/// nobody reads any more.
#[derive(Clone)]
pub struct AnalyticsCache {
    cache: Cache<u64, AnalyticsReport>,
    generation: Arc<AtomicU64>,
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(REPORT_TTL)
            .build();
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The current report, rebuilt from the store when the cached copy expired.
    ///
    /// # Errors
    ///
    /// Returns the store error if loading orders, products or users fails.
    #[instrument(skip_all)]
    pub async fn report(
        &self,
        store: &dyn Store,
        now: DateTime<Utc>,
    ) -> StoreResult<AnalyticsReport> {
        self.get_or_build(build_report(store, now)).await
    }

    async fn get_or_build<F>(&self, build: F) -> StoreResult<AnalyticsReport>
    where
        F: Future<Output = StoreResult<AnalyticsReport>>,
    {
        let generation = self.generation.load(Ordering::Acquire);
        if let Some(report) = self.cache.get(&generation).await {
            return Ok(report);
        }

        let report = build.await?;
        self.cache.insert(generation, report.clone()).await;
        tracing::debug!(generation, "Analytics report rebuilt");
        Ok(report)
    }

    /// Drop the cached report, including one still being built.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

async fn build_report(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<AnalyticsReport> {
    let orders = store.list_orders(OrderQuery::default()).await?;
    let products = store.all_products().await?;
    let customers: Vec<_> = store
        .list_users()
        .await?
        .into_iter()
        .filter(|u| !u.is_admin)
        .collect();

    Ok(analytics_report(&orders, &products, &customers, now))
}

/// Dashboard headline numbers. Always computed live.
///
/// # Errors
///
/// Returns the store error if loading products or orders fails.
pub async fn current_stats(store: &dyn Store, now: DateTime<Utc>) -> StoreResult<StoreStats> {
    let products = store.all_products().await?;
    let orders = store.list_orders(OrderQuery::default()).await?;
    Ok(store_stats(&products, &orders, now))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use techmart_core::catalog::sample_products;
    use techmart_store::MemoryStore;

    #[tokio::test]
    async fn test_report_is_cached_until_invalidated() {
        let store = MemoryStore::new();
        let cache = AnalyticsCache::new();
        let now = Utc::now();

        let first = cache.report(&store, now).await.unwrap();
        assert_eq!(first.products.total, 0);

        let product = sample_products().into_iter().next().unwrap();
        store.create_product(product).await.unwrap();

        let cached = cache.report(&store, now).await.unwrap();
        assert_eq!(cached.products.total, 0);

        cache.invalidate().await;
        let fresh = cache.report(&store, now).await.unwrap();
        assert_eq!(fresh.products.total, 1);
    }

    #[tokio::test]
    async fn test_write_during_rebuild_is_not_masked() {
        let store = MemoryStore::new();
        let cache = AnalyticsCache::new();
        let now = Utc::now();

        // A product lands while a rebuild that has not seen it is in flight
        let stale = cache
            .get_or_build(async {
                let report = build_report(&store, now).await;
                let product = sample_products().into_iter().next().unwrap();
                store.create_product(product).await.unwrap();
                cache.invalidate().await;
                report
            })
            .await
            .unwrap();
        assert_eq!(stale.products.total, 0);

        let fresh = cache.report(&store, now).await.unwrap();
        assert_eq!(fresh.products.total, 1);
    }

    #[tokio::test]
    async fn test_current_stats_counts_products() {
        let store = MemoryStore::new();
        for product in sample_products() {
            store.create_product(product).await.unwrap();
        }

        let stats = current_stats(&store, Utc::now()).await.unwrap();
        assert_eq!(stats.total_products, 6);
        assert_eq!(stats.orders_today, 0);
    }
}
