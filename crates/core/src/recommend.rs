//! Browsing history and product recommendations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::ProductId;

/// Maximum number of remembered product views per viewer.
pub const HISTORY_CAPACITY: usize = 50;

/// Default number of recommendations returned.
pub const DEFAULT_LIMIT: usize = 6;

/// How many recent views feed category-based recommendations.
const RECENT_VIEWS: usize = 10;

/// Maximum number of frequently-bought-together suggestions.
const COMPANION_LIMIT: usize = 4;

/// A product view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub product_id: ProductId,
    pub viewed_at: DateTime<Utc>,
}

/// Products a viewer looked at, most recent first, each at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowsingHistory {
    entries: Vec<HistoryEntry>,
}

impl BrowsingHistory {
    /// Record a view, moving the product to the front and dropping the
    /// oldest entries beyond [`HISTORY_CAPACITY`].
    pub fn record(&mut self, product_id: ProductId, viewed_at: DateTime<Utc>) {
        self.entries.retain(|e| e.product_id != product_id);
        self.entries.insert(
            0,
            HistoryEntry {
                product_id,
                viewed_at,
            },
        );
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// The `limit` most recent views.
    #[must_use]
    pub fn recent(&self, limit: usize) -> &[HistoryEntry] {
        self.entries
            .get(..limit.min(self.entries.len()))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn available(product: &Product) -> bool {
    product.is_active && product.in_stock()
}

fn fill<'a>(
    picked: &mut Vec<&'a Product>,
    candidates: impl Iterator<Item = &'a Product>,
    skip: Option<ProductId>,
    limit: usize,
) {
    for product in candidates {
        if picked.len() >= limit {
            return;
        }
        if Some(product.id) != skip && !picked.iter().any(|p| p.id == product.id) {
            picked.push(product);
        }
    }
}

/// Rank products to show next to `current` (if any) for a viewer.
///
/// Three passes fill the list in order until `limit` is reached:
/// 1. in-stock products in the current product's category
/// 2. in-stock products from the categories of the last ten viewed products,
///    skipping those already viewed
/// 3. the highest-rated in-stock products
///
/// The current product is never recommended and no product appears twice.
#[must_use]
pub fn recommend(
    current: Option<&Product>,
    history: &BrowsingHistory,
    catalog: &[Product],
    limit: usize,
) -> Vec<Product> {
    let skip = current.map(|p| p.id);
    let mut picked: Vec<&Product> = Vec::with_capacity(limit);

    if let Some(current) = current {
        fill(
            &mut picked,
            catalog
                .iter()
                .filter(|p| available(p) && p.category == current.category),
            skip,
            limit,
        );
    }

    let viewed: Vec<ProductId> = history
        .recent(RECENT_VIEWS)
        .iter()
        .map(|e| e.product_id)
        .collect();
    let categories: Vec<&str> = catalog
        .iter()
        .filter(|p| viewed.contains(&p.id))
        .map(|p| p.category.as_str())
        .collect();
    fill(
        &mut picked,
        catalog.iter().filter(|p| {
            available(p) && categories.contains(&p.category.as_str()) && !viewed.contains(&p.id)
        }),
        skip,
        limit,
    );

    let mut by_rating: Vec<&Product> = catalog.iter().filter(|p| available(p)).collect();
    by_rating.sort_by(|a, b| b.rating.cmp(&a.rating));
    fill(&mut picked, by_rating.into_iter(), skip, limit);

    picked.into_iter().cloned().collect()
}

/// Categories usually bought alongside `category`.
#[must_use]
pub fn complementary_categories(category: &str) -> Vec<&str> {
    match category {
        "phones" => vec!["accessories", "cases"],
        "laptops" => vec!["accessories", "bags"],
        "desktops" => vec!["accessories", "monitors"],
        "accessories" => vec!["phones", "laptops"],
        other => vec![other],
    }
}

/// Up to four in-stock products from categories that complement `product`.
#[must_use]
pub fn frequently_bought_together(product: &Product, catalog: &[Product]) -> Vec<Product> {
    let targets = complementary_categories(&product.category);
    catalog
        .iter()
        .filter(|p| p.id != product.id && available(p) && targets.contains(&p.category.as_str()))
        .take(COMPANION_LIMIT)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::sample_products;

    fn catalog() -> Vec<Product> {
        sample_products()
            .into_iter()
            .map(|p| p.into_product(ProductId::new_v4(), Utc::now()))
            .collect()
    }

    fn by_name<'a>(catalog: &'a [Product], name: &str) -> &'a Product {
        catalog.iter().find(|p| p.name == name).unwrap()
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_history_most_recent_first_without_duplicates() {
        let mut history = BrowsingHistory::default();
        let a = ProductId::new_v4();
        let b = ProductId::new_v4();
        history.record(a, Utc::now());
        history.record(b, Utc::now());
        history.record(a, Utc::now());

        let ids: Vec<_> = history.recent(10).iter().map(|e| e.product_id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_history_is_capped() {
        let mut history = BrowsingHistory::default();
        let first = ProductId::new_v4();
        history.record(first, Utc::now());
        for _ in 0..HISTORY_CAPACITY {
            history.record(ProductId::new_v4(), Utc::now());
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert!(history.recent(HISTORY_CAPACITY).iter().all(|e| e.product_id != first));
    }

    #[test]
    fn test_same_category_first_and_never_current() {
        let catalog = catalog();
        let iphone = by_name(&catalog, "iPhone 15 Pro");
        let picks = recommend(Some(iphone), &BrowsingHistory::default(), &catalog, 6);

        assert_eq!(picks.len(), 5);
        assert_eq!(picks[0].name, "Samsung Galaxy S24 Ultra");
        assert!(picks.iter().all(|p| p.id != iphone.id));
    }

    #[test]
    fn test_history_categories_exclude_viewed() {
        let catalog = catalog();
        let mut history = BrowsingHistory::default();
        history.record(by_name(&catalog, "MacBook Air M3").id, Utc::now());

        let picks = recommend(None, &history, &catalog, 1);
        assert_eq!(names(&picks), vec!["ASUS ROG Strix G15"]);
    }

    #[test]
    fn test_falls_back_to_highest_rated() {
        let catalog = catalog();
        let picks = recommend(None, &BrowsingHistory::default(), &catalog, 2);
        assert_eq!(names(&picks), vec!["Sony WH-1000XM5", "MacBook Air M3"]);
    }

    #[test]
    fn test_out_of_stock_never_recommended() {
        let mut catalog = catalog();
        catalog[4].stock = 0;
        let iphone = catalog[0].clone();
        let picks = recommend(Some(&iphone), &BrowsingHistory::default(), &catalog, 6);
        assert!(picks.iter().all(|p| p.stock > 0));
        assert_eq!(picks.len(), 4);
    }

    #[test]
    fn test_frequently_bought_together() {
        let catalog = catalog();
        let phone = by_name(&catalog, "iPhone 15 Pro");
        assert_eq!(
            names(&frequently_bought_together(phone, &catalog)),
            vec!["Sony WH-1000XM5"]
        );

        let headphones = by_name(&catalog, "Sony WH-1000XM5");
        assert_eq!(frequently_bought_together(headphones, &catalog).len(), 4);
    }

    #[test]
    fn test_unknown_category_uses_itself() {
        assert_eq!(complementary_categories("cameras"), vec!["cameras"]);
    }
}
