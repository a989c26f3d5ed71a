//! Seed the catalog with the sample products.
//!
//! # Usage
//!
//! ```bash
//! # Seed an empty catalog
//! tm-cli seed
//!
//! # Add any missing sample products to a non-empty catalog
//! tm-cli seed --force
//! ```

use std::collections::HashSet;

use techmart_core::catalog::sample_products;
use techmart_store::Store;

use super::{CommandError, connect};

/// What a seed run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Insert the sample products into `store`.
///
/// A catalog that already has products is left alone unless `force` is set;
/// with `force`, samples whose SKU already exists are skipped.
///
/// # Errors
///
/// Returns the store error if reading or inserting fails.
pub async fn seed_catalog(store: &dyn Store, force: bool) -> Result<SeedReport, CommandError> {
    let existing = store.all_products().await?;
    let samples = sample_products();

    if !existing.is_empty() && !force {
        tracing::info!(
            products = existing.len(),
            "Catalog already has products, skipping (use --force to add missing samples)"
        );
        return Ok(SeedReport {
            inserted: 0,
            skipped: samples.len(),
        });
    }

    let skus: HashSet<&str> = existing.iter().map(|p| p.sku.as_str()).collect();
    let mut report = SeedReport::default();

    for sample in samples {
        if skus.contains(sample.sku.as_str()) {
            tracing::debug!(sku = %sample.sku, "SKU exists, skipping");
            report.skipped += 1;
            continue;
        }
        let product = store.create_product(sample).await?;
        tracing::info!(sku = %product.sku, name = %product.name, "Inserted product");
        report.inserted += 1;
    }

    Ok(report)
}

/// Seed the configured database.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(force: bool) -> Result<(), CommandError> {
    let store = connect().await?;
    let report = seed_catalog(&store, force).await?;
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "Seeding complete!"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use techmart_store::MemoryStore;

    #[tokio::test]
    async fn test_seed_empty_catalog() {
        let store = MemoryStore::new();
        let report = seed_catalog(&store, false).await.unwrap();
        assert_eq!(report.inserted, 6);
        assert_eq!(report.skipped, 0);
        assert_eq!(store.all_products().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_seed_twice_without_force_is_noop() {
        let store = MemoryStore::new();
        seed_catalog(&store, false).await.unwrap();

        let report = seed_catalog(&store, false).await.unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(store.all_products().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_force_adds_only_missing_skus() {
        let store = MemoryStore::new();
        let first = sample_products().into_iter().next().unwrap();
        store.create_product(first).await.unwrap();

        let report = seed_catalog(&store, true).await.unwrap();
        assert_eq!(report, SeedReport { inserted: 5, skipped: 1 });
        assert_eq!(store.all_products().await.unwrap().len(), 6);
    }
}
