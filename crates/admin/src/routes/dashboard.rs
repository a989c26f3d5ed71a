//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use techmart_core::analytics::{StoreStats, store_stats};
use techmart_core::catalog::Product;
use techmart_core::order::{Order, OrderQuery};
use techmart_core::format_money;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const RECENT_ORDERS: usize = 5;

/// Recent order view for dashboard.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: String,
    pub customer_name: String,
    pub total: String,
    pub status: &'static str,
    pub placed: String,
}

impl From<&Order> for RecentOrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            customer_name: order.customer_name.clone(),
            total: format_money(order.total_amount),
            status: order.status.as_str(),
            placed: order.created_at.format("%b %-d, %H:%M").to_string(),
        }
    }
}

/// Low stock product view for dashboard.
#[derive(Debug, Clone)]
pub struct LowStockView {
    pub name: String,
    pub sku: String,
    pub stock: i32,
}

impl From<&Product> for LowStockView {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            sku: product.sku.clone(),
            stock: product.stock,
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_name: String,
    pub stats: StoreStats,
    pub recent_orders: Vec<RecentOrderView>,
    pub low_stock: Vec<LowStockView>,
}

/// `GET /` - dashboard page.
#[instrument(skip_all)]
pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<DashboardTemplate> {
    let (products, orders) = tokio::join!(
        state.store().all_products(),
        state.store().list_orders(OrderQuery::default()),
    );
    let (products, orders) = (products?, orders?);

    Ok(DashboardTemplate {
        admin_name: admin.name,
        stats: store_stats(&products, &orders, Utc::now()),
        recent_orders: orders
            .iter()
            .take(RECENT_ORDERS)
            .map(RecentOrderView::from)
            .collect(),
        low_stock: products
            .iter()
            .filter(|p| p.is_active && p.is_low_stock())
            .map(LowStockView::from)
            .collect(),
    })
}
