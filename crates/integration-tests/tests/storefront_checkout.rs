//! Integration tests for checkout, order tracking and the customer side of
//! the order lifecycle.

use std::sync::Arc;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use techmart_integration_tests::{
    TestClient, admin, by_sku, checkout_body, create_admin_user, decimal, json, new_store,
    seed_catalog, storefront,
};
use techmart_store::{MemoryStore, Store};

async fn place_order(client: &mut TestClient, product_id: &str, quantity: i32, email: &str) -> String {
    let resp = client
        .post(
            "/api/cart",
            json!({ "productId": product_id, "quantity": quantity }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED, "add to cart: {}", resp.text);

    let resp = client.post("/api/checkout", checkout_body(email)).await;
    assert_eq!(resp.status, StatusCode::CREATED, "checkout: {}", resp.text);
    resp.json["id"].as_str().unwrap().to_string()
}

async fn admin_client(store: &Arc<MemoryStore>) -> TestClient {
    create_admin_user(store.as_ref(), "root@techmart.example", "s3cret-pass").await;
    let mut client = TestClient::new(admin(store.clone()));
    let resp = client
        .post(
            "/api/auth/login",
            json!({ "email": "root@techmart.example", "password": "s3cret-pass" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    client
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_guest_checkout() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let phone = by_sku(&products, "IPH15P-128");

    let mut client =
        TestClient::new(storefront(store.clone())).with_header("x-session-id", "guest-checkout");
    client
        .post(
            "/api/cart",
            json!({ "productId": phone.id.to_string(), "quantity": 2 }),
        )
        .await;

    let resp = client
        .post("/api/checkout", checkout_body("ada@example.com"))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let order = &resp.json;
    assert_eq!(order["status"], "processing");
    assert_eq!(order["customerEmail"], "ada@example.com");
    assert_eq!(order["paymentMethod"], "cod");
    assert_eq!(order["shippingAddress"]["country"], "United States");
    assert!(order["userId"].is_null());
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(decimal(&order["totalAmount"]), phone.price * Decimal::from(2));

    // Cart is emptied and stock is taken
    assert_eq!(client.get("/api/cart").await.json["totalItems"], 0);
    let stocked = store.get_product(phone.id).await.unwrap().unwrap();
    assert_eq!(stocked.stock, phone.stock - 2);
}

#[tokio::test]
async fn test_orders_alias_places_order() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let headphones = by_sku(&products, "SONY-WH1000XM5");

    let mut client =
        TestClient::new(storefront(store.clone())).with_header("x-session-id", "guest-alias");
    client
        .post("/api/cart", json!({ "productId": headphones.id.to_string() }))
        .await;

    let resp = client
        .post("/api/orders", checkout_body("alias@example.com"))
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart_and_missing_details() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let phone = by_sku(&products, "IPH15P-128");

    let mut client =
        TestClient::new(storefront(store.clone())).with_header("x-session-id", "guest-empty");
    let resp = client
        .post("/api/checkout", checkout_body("ada@example.com"))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    client
        .post("/api/cart", json!({ "productId": phone.id.to_string() }))
        .await;
    let resp = client
        .post("/api/checkout", json!({ "customerName": "Ada" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.json["details"].is_array(), "field details: {}", resp.text);

    // The cart survives a failed checkout
    assert_eq!(client.get("/api/cart").await.json["totalItems"], 1);
}

#[tokio::test]
async fn test_checkout_rejects_more_than_stock() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let laptop = by_sku(&products, "ASU-ROG-G15");

    let mut client =
        TestClient::new(storefront(store.clone())).with_header("x-session-id", "guest-greedy");
    client
        .post(
            "/api/cart",
            json!({ "productId": laptop.id.to_string(), "quantity": laptop.stock + 1 }),
        )
        .await;

    let resp = client
        .post("/api/checkout", checkout_body("greedy@example.com"))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let unchanged = store.get_product(laptop.id).await.unwrap().unwrap();
    assert_eq!(unchanged.stock, laptop.stock);
}

// ============================================================================
// Tracking
// ============================================================================

#[tokio::test]
async fn test_track_order_by_id() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let phone = by_sku(&products, "IPH15P-128");

    let mut client =
        TestClient::new(storefront(store.clone())).with_header("x-session-id", "guest-track");
    let order_id = place_order(&mut client, &phone.id.to_string(), 1, "track@example.com").await;

    let mut anyone = TestClient::new(storefront(store.clone()));
    let resp = anyone.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["id"], order_id.as_str());

    let resp = anyone.get("/api/orders/not-an-id").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let resp = anyone
        .get("/api/orders/00000000-0000-4000-8000-000000000000")
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_receipt_refund_request_and_rating() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let desktop = by_sku(&products, "DELL-XPS-DT");

    let mut client =
        TestClient::new(storefront(store.clone())).with_header("x-session-id", "guest-cycle");
    let order_id = place_order(&mut client, &desktop.id.to_string(), 1, "cycle@example.com").await;

    // Not delivered yet
    let resp = client
        .post_empty(&format!("/api/orders/{order_id}/confirm-receipt"))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let mut ops = admin_client(&store).await;
    let resp = ops
        .put(
            &format!("/api/orders/{order_id}/status"),
            json!({ "status": "delivered" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = client
        .post(&format!("/api/orders/{order_id}/rating"), json!({ "rating": 5 }))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT, "rating needs receipt first");

    let resp = client
        .post_empty(&format!("/api/orders/{order_id}/confirm-receipt"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["status"], "received");

    let resp = client
        .post(&format!("/api/orders/{order_id}/rating"), json!({ "rating": 9 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client
        .post(&format!("/api/orders/{order_id}/rating"), json!({ "rating": 4 }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["rating"], 4);

    let resp = client
        .post(
            &format!("/api/orders/{order_id}/refund-request"),
            json!({ "reason": "   " }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client
        .post(
            &format!("/api/orders/{order_id}/refund-request"),
            json!({ "reason": "Fan is noisy" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["status"], "refund_requested");
    assert_eq!(resp.json["refundReason"], "Fan is noisy");
}

#[tokio::test]
async fn test_customer_orders_are_private() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let phone = by_sku(&products, "IPH15P-128");

    let mut owner = TestClient::new(storefront(store.clone()));
    owner
        .post(
            "/api/auth/register",
            json!({ "email": "owner@example.com", "password": "secret1", "name": "Owner" }),
        )
        .await;
    let order_id = place_order(&mut owner, &phone.id.to_string(), 1, "owner@example.com").await;

    let mut ops = admin_client(&store).await;
    ops.put(
        &format!("/api/orders/{order_id}/status"),
        json!({ "status": "delivered" }),
    )
    .await;

    let mut stranger = TestClient::new(storefront(store.clone()));
    stranger
        .post(
            "/api/auth/register",
            json!({ "email": "stranger@example.com", "password": "secret1", "name": "Stranger" }),
        )
        .await;
    let resp = stranger
        .post_empty(&format!("/api/orders/{order_id}/confirm-receipt"))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let mut anonymous = TestClient::new(storefront(store.clone()));
    let resp = anonymous
        .post_empty(&format!("/api/orders/{order_id}/confirm-receipt"))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = owner
        .post_empty(&format!("/api/orders/{order_id}/confirm-receipt"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
}
