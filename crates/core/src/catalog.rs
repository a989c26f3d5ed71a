//! Product catalog: products, validation and filtering.

use core::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::ProductId;

/// Active products with fewer units than this are reported as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Highest product rating.
const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Category slug (`phones`, `laptops`, ...).
    pub category: String,
    pub brand: String,
    /// Unique stock-keeping unit.
    pub sku: String,
    pub image_url: Option<String>,
    /// Free-form key/value specifications (`{"storage": "128GB"}`).
    pub specifications: Map<String, Value>,
    pub stock: i32,
    pub rating: Decimal,
    pub review_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least one unit can be sold.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether this product counts toward the low-stock alert.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.is_active && self.stock < LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Validation
// =============================================================================

/// A single invalid input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// One or more invalid input fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Record a field error.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether the given field has an error.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid input: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn check_text(errors: &mut ValidationError, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "must not be empty");
    }
}

fn check_price(errors: &mut ValidationError, price: Decimal) {
    if price.is_sign_negative() && !price.is_zero() {
        errors.push("price", "must not be negative");
    }
}

fn check_stock(errors: &mut ValidationError, stock: i32) {
    if stock < 0 {
        errors.push("stock", "must not be negative");
    }
}

fn check_rating(errors: &mut ValidationError, rating: Decimal) {
    if rating < Decimal::ZERO || rating > MAX_RATING {
        errors.push("rating", "must be between 0 and 5");
    }
}

fn check_review_count(errors: &mut ValidationError, count: i32) {
    if count < 0 {
        errors.push("reviewCount", "must not be negative");
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

// =============================================================================
// Create / Update Inputs
// =============================================================================

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub brand: String,
    pub sku: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub specifications: Map<String, Value>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub review_count: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl NewProduct {
    /// Validate and normalize the input (trims text, drops blank image URLs).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every invalid field.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();
        check_text(&mut errors, "name", &self.name);
        check_text(&mut errors, "description", &self.description);
        check_text(&mut errors, "category", &self.category);
        check_text(&mut errors, "brand", &self.brand);
        check_text(&mut errors, "sku", &self.sku);
        check_price(&mut errors, self.price);
        check_stock(&mut errors, self.stock);
        check_rating(&mut errors, self.rating);
        check_review_count(&mut errors, self.review_count);
        errors.into_result()?;

        self.name = self.name.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.category = self.category.trim().to_lowercase();
        self.brand = self.brand.trim().to_owned();
        self.sku = self.sku.trim().to_owned();
        self.image_url = non_empty(self.image_url);
        Ok(self)
    }

    /// Build the stored product.
    #[must_use]
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            brand: self.brand,
            sku: self.sku,
            image_url: self.image_url,
            specifications: self.specifications,
            stock: self.stock,
            rating: self.rating,
            review_count: self.review_count,
            is_active: self.is_active,
            created_at,
        }
    }
}

/// Partial product update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    /// An empty string clears the image.
    pub image_url: Option<String>,
    pub specifications: Option<Map<String, Value>>,
    pub stock: Option<i32>,
    pub rating: Option<Decimal>,
    pub review_count: Option<i32>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every invalid field.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::default();
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("category", &self.category),
            ("brand", &self.brand),
            ("sku", &self.sku),
        ] {
            if let Some(value) = value {
                check_text(&mut errors, field, value);
            }
        }
        if let Some(price) = self.price {
            check_price(&mut errors, price);
        }
        if let Some(stock) = self.stock {
            check_stock(&mut errors, stock);
        }
        if let Some(rating) = self.rating {
            check_rating(&mut errors, rating);
        }
        if let Some(count) = self.review_count {
            check_review_count(&mut errors, count);
        }
        errors.into_result()?;
        Ok(self)
    }

    /// Apply the patch to a product.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name.trim().to_owned();
        }
        if let Some(description) = self.description {
            product.description = description.trim().to_owned();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(category) = self.category {
            product.category = category.trim().to_lowercase();
        }
        if let Some(brand) = self.brand {
            product.brand = brand.trim().to_owned();
        }
        if let Some(sku) = self.sku {
            product.sku = sku.trim().to_owned();
        }
        if let Some(image_url) = self.image_url {
            product.image_url = non_empty(Some(image_url));
        }
        if let Some(specifications) = self.specifications {
            product.specifications = specifications;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(rating) = self.rating {
            product.rating = rating;
        }
        if let Some(count) = self.review_count {
            product.review_count = count;
        }
        if let Some(is_active) = self.is_active {
            product.is_active = is_active;
        }
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Catalog query filters. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Minimum rating.
    pub rating: Option<Decimal>,
    /// Case-insensitive substring over name, description and brand.
    pub search: Option<String>,
}

impl ProductFilter {
    /// Treat blank text parameters (`?category=`) as unset.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            category: non_empty(self.category),
            brand: non_empty(self.brand),
            search: non_empty(self.search).map(|s| s.to_lowercase()),
            ..self
        }
    }

    /// Whether an active product satisfies every set constraint.
    ///
    /// Inactive products never match.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active {
            return false;
        }
        if self
            .category
            .as_deref()
            .is_some_and(|c| product.category != c)
        {
            return false;
        }
        if self.brand.as_deref().is_some_and(|b| product.brand != b) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.rating.is_some_and(|min| product.rating < min) {
            return false;
        }
        if let Some(query) = self.search.as_deref() {
            let query = query.to_lowercase();
            return product.name.to_lowercase().contains(&query)
                || product.description.to_lowercase().contains(&query)
                || product.brand.to_lowercase().contains(&query);
        }
        true
    }
}

// =============================================================================
// Categories & Brands
// =============================================================================

/// A storefront category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub slug: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

/// Categories shown in the storefront navigation.
pub const CATEGORIES: [Category; 4] = [
    Category {
        slug: "phones",
        name: "Phones",
        icon: "mobile-alt",
        description: "Latest smartphones",
    },
    Category {
        slug: "laptops",
        name: "Laptops",
        icon: "laptop",
        description: "Portable computing",
    },
    Category {
        slug: "desktops",
        name: "Desktops",
        icon: "desktop",
        description: "Gaming & workstations",
    },
    Category {
        slug: "accessories",
        name: "Accessories",
        icon: "headphones",
        description: "Tech accessories",
    },
];

/// Distinct brands of active products, sorted.
#[must_use]
pub fn brands(products: &[Product]) -> Vec<String> {
    let mut brands: Vec<String> = products
        .iter()
        .filter(|p| p.is_active)
        .map(|p| p.brand.clone())
        .collect();
    brands.sort();
    brands.dedup();
    brands
}

// =============================================================================
// Sample Catalog
// =============================================================================

fn specs(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn sample(
    name: &str,
    description: &str,
    price: i64,
    category: &str,
    brand: &str,
    sku: &str,
    image: &str,
    specifications: &[(&str, &str)],
    stock: i32,
    rating_tenths: i64,
    review_count: i32,
) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        description: description.to_owned(),
        price: Decimal::new(price * 100, 2),
        category: category.to_owned(),
        brand: brand.to_owned(),
        sku: sku.to_owned(),
        image_url: Some(format!(
            "https://images.unsplash.com/{image}?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=300"
        )),
        specifications: specs(specifications),
        stock,
        rating: Decimal::new(rating_tenths, 1),
        review_count,
        is_active: true,
    }
}

/// The starter catalog used by `tm-cli seed` and in tests.
#[must_use]
pub fn sample_products() -> Vec<NewProduct> {
    vec![
        sample(
            "iPhone 15 Pro",
            "Latest iPhone with advanced camera system and A17 Pro chip",
            999,
            "phones",
            "Apple",
            "IPH15P-128",
            "photo-1511707171634-5f897ff02aa9",
            &[
                ("storage", "128GB"),
                ("display", "6.1-inch Super Retina XDR"),
                ("processor", "A17 Pro chip"),
                ("camera", "48MP Main camera"),
            ],
            25,
            45,
            128,
        ),
        sample(
            "ASUS ROG Strix G15",
            "Gaming laptop with RTX 4070 and Ryzen 7 processor",
            1299,
            "laptops",
            "ASUS",
            "ASU-ROG-G15",
            "photo-1496181133206-80ce9b88a853",
            &[
                ("processor", "AMD Ryzen 7 7735HS"),
                ("graphics", "NVIDIA RTX 4070"),
                ("ram", "16GB DDR5"),
                ("storage", "512GB SSD"),
            ],
            8,
            45,
            64,
        ),
        sample(
            "Dell XPS Desktop",
            "Powerful desktop for creative professionals and gaming",
            1599,
            "desktops",
            "Dell",
            "DELL-XPS-DT",
            "photo-1547082299-de196ea013d6",
            &[
                ("processor", "Intel Core i7-13700"),
                ("graphics", "NVIDIA RTX 4060"),
                ("ram", "32GB DDR5"),
                ("storage", "1TB SSD"),
            ],
            12,
            47,
            89,
        ),
        sample(
            "Sony WH-1000XM5",
            "Industry-leading noise canceling headphones",
            399,
            "accessories",
            "Sony",
            "SONY-WH1000XM5",
            "photo-1484704849700-f032a568e944",
            &[
                ("type", "Over-ear wireless"),
                ("battery", "30 hours"),
                ("features", "Active noise canceling"),
                ("connectivity", "Bluetooth 5.2"),
            ],
            45,
            49,
            256,
        ),
        sample(
            "Samsung Galaxy S24 Ultra",
            "Flagship Android phone with S Pen and advanced cameras",
            1199,
            "phones",
            "Samsung",
            "SAM-S24U-256",
            "photo-1601784551446-20c9e07cdbdb",
            &[
                ("storage", "256GB"),
                ("display", "6.8-inch Dynamic AMOLED 2X"),
                ("processor", "Snapdragon 8 Gen 3"),
                ("camera", "200MP Main camera"),
            ],
            18,
            46,
            142,
        ),
        sample(
            "MacBook Air M3",
            "Ultra-thin laptop with M3 chip and all-day battery",
            1099,
            "laptops",
            "Apple",
            "MBA-M3-256",
            "photo-1541807084-5c52b6b3adef",
            &[
                ("processor", "Apple M3 chip"),
                ("ram", "8GB unified memory"),
                ("storage", "256GB SSD"),
                ("display", "13.6-inch Liquid Retina"),
            ],
            32,
            48,
            201,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        sample_products()
            .into_iter()
            .map(|p| p.into_product(ProductId::new_v4(), Utc::now()))
            .collect()
    }

    fn names(products: &[Product], filter: &ProductFilter) -> Vec<String> {
        products
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.name.clone())
            .collect()
    }

    #[test]
    fn test_sample_products_are_valid() {
        for product in sample_products() {
            assert!(product.validate().is_ok());
        }
    }

    #[test]
    fn test_empty_filter_matches_all_active() {
        let mut products = catalog();
        products[0].is_active = false;
        assert_eq!(names(&products, &ProductFilter::default()).len(), 5);
    }

    #[test]
    fn test_filter_by_category_and_brand() {
        let products = catalog();
        let filter = ProductFilter {
            category: Some("laptops".into()),
            brand: Some("Apple".into()),
            ..Default::default()
        };
        assert_eq!(names(&products, &filter), vec!["MacBook Air M3"]);
    }

    #[test]
    fn test_filter_price_bounds_are_inclusive() {
        let products = catalog();
        let filter = ProductFilter {
            min_price: Some(Decimal::new(999, 0)),
            max_price: Some(Decimal::new(1099, 0)),
            ..Default::default()
        };
        assert_eq!(
            names(&products, &filter),
            vec!["iPhone 15 Pro", "MacBook Air M3"]
        );
    }

    #[test]
    fn test_filter_min_rating() {
        let products = catalog();
        let filter = ProductFilter {
            rating: Some(Decimal::new(48, 1)),
            ..Default::default()
        };
        assert_eq!(
            names(&products, &filter),
            vec!["Sony WH-1000XM5", "MacBook Air M3"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_over_brand_and_description() {
        let products = catalog();
        let filter = ProductFilter {
            search: Some("NOISE".into()),
            ..Default::default()
        };
        assert_eq!(names(&products, &filter), vec!["Sony WH-1000XM5"]);

        let filter = ProductFilter {
            search: Some("samsung".into()),
            ..Default::default()
        };
        assert_eq!(names(&products, &filter), vec!["Samsung Galaxy S24 Ultra"]);
    }

    #[test]
    fn test_normalized_drops_blank_parameters() {
        let filter = ProductFilter {
            category: Some("  ".into()),
            search: Some(" Phone ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.category, None);
        assert_eq!(filter.search.as_deref(), Some("phone"));
    }

    #[test]
    fn test_new_product_validation_reports_every_field() {
        let input = NewProduct {
            name: " ".into(),
            description: "d".into(),
            price: Decimal::new(-1, 0),
            category: "phones".into(),
            brand: "b".into(),
            sku: String::new(),
            image_url: None,
            specifications: Map::new(),
            stock: -3,
            rating: Decimal::new(6, 0),
            review_count: 0,
            is_active: true,
        };
        let err = input.validate().unwrap_err();
        for field in ["name", "price", "sku", "stock", "rating"] {
            assert!(err.has(field), "missing error for {field}");
        }
        assert!(!err.has("description"));
    }

    #[test]
    fn test_new_product_defaults_from_json() {
        let input: NewProduct = serde_json::from_str(
            r#"{"name":"Pixel 9","description":"Phone","price":"799.00",
                "category":"Phones","brand":"Google","sku":"PX9"}"#,
        )
        .unwrap();
        let input = input.validate().unwrap();
        assert_eq!(input.stock, 0);
        assert!(input.is_active);
        assert_eq!(input.category, "phones");
        assert!(input.specifications.is_empty());
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut product = catalog().remove(0);
        let patch = ProductPatch {
            price: Some(Decimal::new(89_900, 2)),
            image_url: Some(String::new()),
            ..Default::default()
        };
        patch.validate().unwrap().apply(&mut product);
        assert_eq!(product.price, Decimal::new(899, 0));
        assert_eq!(product.image_url, None);
        assert_eq!(product.name, "iPhone 15 Pro");
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        let patch = ProductPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().unwrap_err().has("name"));
    }

    #[test]
    fn test_brands_sorted_and_deduplicated() {
        assert_eq!(
            brands(&catalog()),
            vec!["ASUS", "Apple", "Dell", "Samsung", "Sony"]
        );
    }

    #[test]
    fn test_low_stock() {
        let products = catalog();
        let low: Vec<_> = products.iter().filter(|p| p.is_low_stock()).collect();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "ASUS ROG Strix G15");
    }
}
