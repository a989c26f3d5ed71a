//! Background order fulfillment.
//!
//! Stands in for a carrier integration: orders that have been `processing`
//! for longer than the configured delay are marked `delivered`.

use chrono::{TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, instrument};

use techmart_core::OrderId;
use techmart_store::{SharedStore, StoreResult};

use crate::config::FulfillmentConfig;

/// Spawn the fulfillment worker.
///
/// The first run happens immediately, then once per `config.interval`.
pub fn spawn_fulfillment_worker(store: SharedStore, config: FulfillmentConfig) -> JoinHandle<()> {
    info!(
        interval_secs = config.interval.as_secs(),
        delay_secs = config.delay.as_secs(),
        "Spawning fulfillment worker"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = run_once(&store, config).await {
                error!(error = %e, "Fulfillment run failed");
            }
        }
    })
}

/// Mark every order placed more than `config.delay` ago as delivered.
///
/// # Errors
///
/// Returns the store error if the update fails.
#[instrument(skip_all)]
pub async fn run_once(store: &SharedStore, config: FulfillmentConfig) -> StoreResult<Vec<OrderId>> {
    let delay = TimeDelta::from_std(config.delay).unwrap_or(TimeDelta::MAX);
    let cutoff = Utc::now()
        .checked_sub_signed(delay)
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);

    let delivered = store.mark_delivered(cutoff).await?;
    if !delivered.is_empty() {
        info!(count = delivered.len(), orders = ?delivered, "Orders marked delivered");
    }
    Ok(delivered)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use techmart_core::OrderStatus;
    use techmart_core::catalog::NewProduct;
    use techmart_core::order::{CheckoutRequest, ShippingAddress, draft_order};
    use techmart_core::cart::CartSummary;
    use techmart_core::{CartOwner, GuestId};
    use techmart_store::MemoryStore;

    use super::*;

    async fn place_guest_order(store: &SharedStore) -> OrderId {
        let product = store
            .create_product(NewProduct {
                name: "Cable".to_string(),
                description: "USB-C cable".to_string(),
                price: "9.99".parse().unwrap(),
                category: "accessories".to_string(),
                brand: "Anker".to_string(),
                sku: "CBL-1".to_string(),
                image_url: None,
                specifications: serde_json::Map::new(),
                stock: 5,
                rating: "4.5".parse().unwrap(),
                review_count: 0,
                is_active: true,
            })
            .await
            .unwrap();
        let owner = CartOwner::Guest(GuestId::parse("guest-worker").unwrap());
        store.add_to_cart(&owner, product.id, 1).await.unwrap();
        let lines = store.cart_lines(&owner).await.unwrap();
        let summary = CartSummary::build(lines, &[product]);
        let request = CheckoutRequest {
            customer_name: Some("Grace".to_string()),
            customer_email: Some("grace@example.com".to_string()),
            shipping_address: Some(ShippingAddress {
                address: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip_code: "62701".to_string(),
                country: "United States".to_string(),
            }),
            ..CheckoutRequest::default()
        };
        let draft = draft_order(request, None, &summary.items).unwrap();
        store.place_order(&owner, draft).await.unwrap().id
    }

    #[tokio::test]
    async fn test_run_once_respects_delay() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let order_id = place_guest_order(&store).await;

        let waiting = FulfillmentConfig {
            interval: Duration::from_secs(60),
            delay: Duration::from_secs(3600),
        };
        assert!(run_once(&store, waiting).await.unwrap().is_empty());

        let immediate = FulfillmentConfig {
            interval: Duration::from_secs(60),
            delay: Duration::ZERO,
        };
        let delivered = run_once(&store, immediate).await.unwrap();
        assert_eq!(delivered, vec![order_id]);

        let order = store.get_order(order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert!(order.delivered_at.is_some());

        // Already delivered orders are not touched again.
        assert!(run_once(&store, immediate).await.unwrap().is_empty());
    }
}
