//! Dashboard statistics and the analytics report.
//!
//! Everything here is computed from slices of orders, products and users so it
//! works the same over any store. Revenue never includes cancelled or refunded
//! orders.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::catalog::Product;
use crate::order::Order;
use crate::user::User;

/// Length of a comparison window and of a revenue chart bucket.
const WINDOW_DAYS: i64 = 30;

/// Number of revenue chart buckets.
const REVENUE_BUCKETS: i64 = 6;

/// Number of entries in the top products list.
const TOP_PRODUCTS: usize = 5;

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_products: i64,
    pub orders_today: i64,
    pub revenue: Decimal,
    pub low_stock: i64,
}

fn count<T>(items: impl Iterator<Item = T>) -> i64 {
    i64::try_from(items.count()).unwrap_or(i64::MAX)
}

fn revenue<'a>(orders: impl Iterator<Item = &'a Order>) -> Decimal {
    orders
        .filter(|o| !o.status.is_voided())
        .map(|o| o.total_amount)
        .sum()
}

/// Compute dashboard statistics.
#[must_use]
pub fn store_stats(products: &[Product], orders: &[Order], now: DateTime<Utc>) -> StoreStats {
    let today = now.date_naive();
    StoreStats {
        total_products: count(products.iter().filter(|p| p.is_active)),
        orders_today: count(orders.iter().filter(|o| o.created_at.date_naive() == today)),
        revenue: revenue(orders.iter())
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        low_stock: count(products.iter().filter(|p| p.is_low_stock())),
    }
}

// =============================================================================
// Analytics Report
// =============================================================================

/// Direction of a metric relative to the previous window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// A headline metric with its 30-day change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard<T> {
    pub total: T,
    /// Percent change of the last 30 days over the 30 before, one decimal.
    pub change: f64,
    pub trend: Trend,
}

impl<T> MetricCard<T> {
    /// Build a card comparing the `recent` window with the `previous` one.
    ///
    /// The change is 0 when the previous window is empty.
    fn new(total: T, recent: Decimal, previous: Decimal) -> Self {
        let change = if previous > Decimal::ZERO {
            ((recent - previous) / previous * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };
        Self {
            total,
            change: change.to_f64().unwrap_or_default(),
            trend: if change >= Decimal::ZERO {
                Trend::Up
            } else {
                Trend::Down
            },
        }
    }
}

/// Revenue and order count for one chart bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenuePoint {
    /// Month abbreviation of the bucket start (`Jan`, `Feb`, ...).
    pub month: String,
    pub revenue: Decimal,
    pub orders: i64,
}

/// Units sold and revenue for a product or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub sales: i64,
    pub revenue: Decimal,
}

/// The admin analytics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub revenue: MetricCard<Decimal>,
    pub orders: MetricCard<i64>,
    pub customers: MetricCard<i64>,
    pub products: MetricCard<i64>,
    pub revenue_data: Vec<RevenuePoint>,
    pub top_products: Vec<SalesLine>,
    pub category_data: Vec<SalesLine>,
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy)]
struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

fn windows(now: DateTime<Utc>) -> (Window, Window) {
    let days = Duration::days(WINDOW_DAYS);
    let recent = Window {
        start: now - days,
        end: DateTime::<Utc>::MAX_UTC,
    };
    let previous = Window {
        start: now - days - days,
        end: now - days,
    };
    (recent, previous)
}

fn created_in(created: &[DateTime<Utc>], window: Window) -> Decimal {
    Decimal::from(count(created.iter().filter(|at| window.contains(**at))))
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(now, |start| start.and_utc())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

#[derive(Default)]
struct Tally {
    sales: i64,
    revenue: Decimal,
}

/// Build the analytics report.
///
/// `users` should contain customers only; admins are not counted.
#[must_use]
pub fn analytics_report(
    orders: &[Order],
    products: &[Product],
    users: &[User],
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let (recent, previous) = windows(now);

    let revenue_card = MetricCard::new(
        revenue(orders.iter()),
        revenue(orders.iter().filter(|o| recent.contains(o.created_at))),
        revenue(orders.iter().filter(|o| previous.contains(o.created_at))),
    );

    let order_times: Vec<_> = orders.iter().map(|o| o.created_at).collect();
    let orders_card = MetricCard::new(
        count(orders.iter()),
        created_in(&order_times, recent),
        created_in(&order_times, previous),
    );

    let user_times: Vec<_> = users.iter().map(|u| u.created_at).collect();
    let customers_card = MetricCard::new(
        count(users.iter()),
        created_in(&user_times, recent),
        created_in(&user_times, previous),
    );

    let product_times: Vec<_> = products.iter().map(|p| p.created_at).collect();
    let products_card = MetricCard::new(
        count(products.iter()),
        created_in(&product_times, recent),
        created_in(&product_times, previous),
    );

    let anchor = start_of_month(now);
    let revenue_data = (0..REVENUE_BUCKETS)
        .rev()
        .map(|i| {
            let start = anchor - Duration::days(WINDOW_DAYS * i);
            let bucket = Window {
                start,
                end: start + Duration::days(WINDOW_DAYS),
            };
            let in_bucket = || orders.iter().filter(move |o| bucket.contains(o.created_at));
            RevenuePoint {
                month: start.format("%b").to_string(),
                revenue: revenue(in_bucket()),
                orders: count(in_bucket()),
            }
        })
        .collect();

    let mut by_product: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut by_category: BTreeMap<String, Tally> = BTreeMap::new();
    for item in orders
        .iter()
        .filter(|o| !o.status.is_voided())
        .flat_map(|o| &o.items)
    {
        let quantity = i64::from(item.quantity);
        let line_total = item.line_total();

        let product = by_product.entry(item.product_name.as_str()).or_default();
        product.sales += quantity;
        product.revenue += line_total;

        let category = by_category.entry(capitalize(&item.category)).or_default();
        category.sales += quantity;
        category.revenue += line_total;
    }

    let mut top_products: Vec<SalesLine> = by_product
        .into_iter()
        .map(|(name, tally)| SalesLine {
            name: Some(name.to_owned()),
            category: None,
            sales: tally.sales,
            revenue: tally.revenue,
        })
        .collect();
    // Stable sort keeps ties in name order.
    top_products.sort_by(|a, b| b.sales.cmp(&a.sales));
    top_products.truncate(TOP_PRODUCTS);

    let category_data = by_category
        .into_iter()
        .map(|(category, tally)| SalesLine {
            name: None,
            category: Some(category),
            sales: tally.sales,
            revenue: tally.revenue,
        })
        .collect();

    AnalyticsReport {
        revenue: revenue_card,
        orders: orders_card,
        customers: customers_card,
        products: products_card,
        revenue_data,
        top_products,
        category_data,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::sample_products;
    use crate::order::{OrderItem, ShippingAddress};
    use crate::types::{Email, OrderId, OrderStatus, PaymentMethod, ProductId};

    fn now() -> DateTime<Utc> {
        "2025-06-15T12:00:00Z".parse().unwrap()
    }

    fn item(name: &str, category: &str, price: i64, quantity: i32) -> OrderItem {
        OrderItem {
            product_id: ProductId::new_v4(),
            product_name: name.into(),
            category: category.into(),
            price: Decimal::new(price, 0),
            quantity,
        }
    }

    fn order(days_ago: i64, status: OrderStatus, items: Vec<OrderItem>) -> Order {
        let created_at = now() - Duration::days(days_ago);
        Order {
            id: OrderId::new_v4(),
            user_id: None,
            customer_name: "Ana".into(),
            customer_email: Email::parse("ana@example.com").unwrap(),
            customer_phone: None,
            shipping_address: ShippingAddress {
                address: "1 Main".into(),
                city: "X".into(),
                state: "Y".into(),
                zip_code: "1".into(),
                country: "United States".into(),
            },
            total_amount: items.iter().map(OrderItem::line_total).sum(),
            items,
            payment_method: PaymentMethod::Cod,
            status,
            refund_reason: None,
            refund_amount: None,
            refunded_at: None,
            rating: None,
            delivered_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_stats_exclude_voided_revenue() {
        let products: Vec<Product> = sample_products()
            .into_iter()
            .map(|p| p.into_product(ProductId::new_v4(), now()))
            .collect();
        let orders = vec![
            order(0, OrderStatus::Processing, vec![item("A", "phones", 100, 2)]),
            order(0, OrderStatus::Cancelled, vec![item("B", "phones", 500, 1)]),
            order(3, OrderStatus::Refunded, vec![item("C", "laptops", 700, 1)]),
            order(3, OrderStatus::Delivered, vec![item("D", "laptops", 50, 1)]),
        ];

        let stats = store_stats(&products, &orders, now());

        assert_eq!(stats.total_products, 6);
        assert_eq!(stats.orders_today, 2);
        assert_eq!(stats.revenue, Decimal::new(250, 0));
        assert_eq!(stats.low_stock, 1);
    }

    #[test]
    fn test_stats_revenue_rounds_to_whole_units() {
        let mut o = order(0, OrderStatus::Processing, vec![]);
        o.total_amount = Decimal::new(10050, 2);
        assert_eq!(store_stats(&[], &[o], now()).revenue, Decimal::new(101, 0));
    }

    #[test]
    fn test_metric_change_against_previous_window() {
        let orders = vec![
            order(5, OrderStatus::Delivered, vec![item("A", "phones", 300, 1)]),
            order(10, OrderStatus::Delivered, vec![item("A", "phones", 300, 1)]),
            order(45, OrderStatus::Delivered, vec![item("A", "phones", 400, 1)]),
        ];
        let report = analytics_report(&orders, &[], &[], now());

        assert_eq!(report.revenue.total, Decimal::new(1000, 0));
        assert!((report.revenue.change - 50.0).abs() < f64::EPSILON);
        assert_eq!(report.revenue.trend, Trend::Up);
        assert_eq!(report.orders.total, 3);
        assert!((report.orders.change - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metric_change_is_zero_without_history() {
        let orders = vec![order(1, OrderStatus::Delivered, vec![item("A", "phones", 10, 1)])];
        let report = analytics_report(&orders, &[], &[], now());
        assert!(report.revenue.change.abs() < f64::EPSILON);
        assert_eq!(report.revenue.trend, Trend::Up);
    }

    #[test]
    fn test_metric_trend_down() {
        let orders = vec![
            order(5, OrderStatus::Delivered, vec![item("A", "phones", 100, 1)]),
            order(40, OrderStatus::Delivered, vec![item("A", "phones", 400, 1)]),
        ];
        let report = analytics_report(&orders, &[], &[], now());
        assert!((report.revenue.change + 75.0).abs() < f64::EPSILON);
        assert_eq!(report.revenue.trend, Trend::Down);
    }

    #[test]
    fn test_revenue_data_six_buckets_oldest_first() {
        let orders = vec![order(0, OrderStatus::Delivered, vec![item("A", "phones", 10, 1)])];
        let report = analytics_report(&orders, &[], &[], now());

        let months: Vec<&str> = report.revenue_data.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        let last = report.revenue_data.last().unwrap();
        assert_eq!(last.orders, 1);
        assert_eq!(last.revenue, Decimal::new(10, 0));
    }

    #[test]
    fn test_top_products_and_categories() {
        let orders = vec![
            order(
                1,
                OrderStatus::Delivered,
                vec![item("Phone", "phones", 100, 3), item("Case", "accessories", 10, 1)],
            ),
            order(2, OrderStatus::Processing, vec![item("Laptop", "laptops", 900, 2)]),
            order(2, OrderStatus::Cancelled, vec![item("Case", "accessories", 10, 50)]),
        ];
        let report = analytics_report(&orders, &[], &[], now());

        let names: Vec<_> = report
            .top_products
            .iter()
            .map(|p| p.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["Phone", "Laptop", "Case"]);

        let phones = report
            .category_data
            .iter()
            .find(|c| c.category.as_deref() == Some("Phones"))
            .unwrap();
        assert_eq!(phones.sales, 3);
        assert_eq!(phones.revenue, Decimal::new(300, 0));
    }

    #[test]
    fn test_report_json_shape() {
        let report = analytics_report(&[], &[], &[], now());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["orders"]["trend"], "up");
        assert!(json["revenueData"].is_array());
        assert!(json["topProducts"].is_array());
        assert!(json["categoryData"].is_array());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("phones"), "Phones");
        assert_eq!(capitalize("ACCESSORIES"), "Accessories");
        assert_eq!(capitalize(""), "");
    }
}
