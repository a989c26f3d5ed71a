//! Integration tests for the admin application.

use std::sync::Arc;

use axum::http::{StatusCode, header};
use rust_decimal::Decimal;
use techmart_integration_tests::{
    TestClient, admin, by_sku, checkout_body, create_admin_user, decimal, json, new_store,
    seed_catalog, storefront,
};
use techmart_store::MemoryStore;

const ADMIN_EMAIL: &str = "root@techmart.example";
const ADMIN_PASSWORD: &str = "s3cret-pass";

async fn logged_in_admin(store: &Arc<MemoryStore>) -> TestClient {
    create_admin_user(store.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let mut client = TestClient::new(admin(store.clone()));
    let resp = client
        .post(
            "/api/auth/login",
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK, "admin login: {}", resp.text);
    client
}

/// Place a guest order for one unit of `sku` through the storefront.
async fn guest_order(store: &Arc<MemoryStore>, sku: &str, guest: &str) -> (String, Decimal) {
    let products = techmart_store::Store::all_products(store.as_ref())
        .await
        .unwrap();
    let product = by_sku(&products, sku);
    let mut shop = TestClient::new(storefront(store.clone())).with_header("x-session-id", guest);
    shop.post("/api/cart", json!({ "productId": product.id.to_string() }))
        .await;
    let resp = shop.post("/api/checkout", checkout_body("buyer@example.com")).await;
    assert_eq!(resp.status, StatusCode::CREATED, "checkout: {}", resp.text);
    (
        resp.json["id"].as_str().unwrap().to_string(),
        decimal(&resp.json["totalAmount"]),
    )
}

fn new_product_body(sku: &str) -> serde_json::Value {
    json!({
        "name": "Pixel 9",
        "description": "Google phone",
        "price": "799.00",
        "category": "Phones",
        "brand": "Google",
        "sku": sku,
        "stock": 12
    })
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_api_requires_admin_session() {
    let store = new_store();
    let mut client = TestClient::new(admin(store.clone()));

    for uri in ["/api/products", "/api/orders", "/api/admin/stats", "/api/auth/me"] {
        let resp = client.get(uri).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(resp.json["error"], "Unauthorized");
    }

    // Pages redirect to the login form instead
    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.headers["location"], "/login");
}

#[tokio::test]
async fn test_customer_cannot_sign_in() {
    let store = new_store();
    let mut shop = TestClient::new(storefront(store.clone()));
    shop.post(
        "/api/auth/register",
        json!({ "email": "cust@example.com", "password": "secret1", "name": "Cust" }),
    )
    .await;

    let mut client = TestClient::new(admin(store.clone()));
    let resp = client
        .post(
            "/api/auth/login",
            json!({ "email": "cust@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.json["error"], "Admin access required");

    let resp = client
        .post(
            "/api/auth/login",
            json!({ "email": "cust@example.com", "password": "wrong-pass" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = client.post("/api/auth/login", json!({ "email": "" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_login_me_logout() {
    let store = new_store();
    let mut client = logged_in_admin(&store).await;

    let resp = client.get("/api/auth/me").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["user"]["email"], ADMIN_EMAIL);
    assert_eq!(resp.json["user"]["isAdmin"], true);

    let resp = client.post_empty("/api/auth/logout").await;
    assert_eq!(resp.json["ok"], true);
    assert_eq!(
        client.get("/api/auth/me").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_demoted_admin_loses_session() {
    let store = new_store();
    let mut client = logged_in_admin(&store).await;

    let email = techmart_core::Email::parse(ADMIN_EMAIL).unwrap();
    assert!(
        techmart_store::Store::set_admin(store.as_ref(), &email, false)
            .await
            .unwrap()
    );

    let resp = client.get("/api/auth/me").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Dashboard
// ============================================================================

#[tokio::test]
async fn test_dashboard_redirects_to_login() {
    let store = new_store();
    let mut client = TestClient::new(admin(store.clone()));

    let resp = client.get("/").await;
    assert!(resp.status.is_redirection());
    assert_eq!(
        resp.headers.get(header::LOCATION).unwrap().to_str().unwrap(),
        "/login"
    );

    let resp = client.get("/login").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.text.contains("<form"));
}

#[tokio::test]
async fn test_dashboard_renders_for_admin() {
    let store = new_store();
    seed_catalog(store.as_ref()).await;
    let mut client = logged_in_admin(&store).await;

    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.text.contains("Store Admin"));
    assert!(resp.text.contains("ASU-ROG-G15"), "low stock product listed");

    let resp = client.get("/login").await;
    assert!(resp.status.is_redirection(), "already signed in");
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_crud() {
    let store = new_store();
    let mut client = logged_in_admin(&store).await;

    let resp = client.post("/api/products", new_product_body("PIX9-128")).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.json["category"], "phones");
    assert_eq!(resp.json["isActive"], true);
    let id = resp.json["id"].as_str().unwrap().to_string();

    let resp = client.post("/api/products", new_product_body("PIX9-128")).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);

    let resp = client
        .put(
            &format!("/api/products/{id}"),
            json!({ "price": 749, "stock": 3 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(decimal(&resp.json["price"]), Decimal::from(749));
    assert_eq!(resp.json["stock"], 3);
    assert_eq!(resp.json["name"], "Pixel 9", "absent fields unchanged");

    let resp = client.get(&format!("/api/products/{id}")).await;
    assert_eq!(resp.json["stock"], 3);

    assert_eq!(
        client.delete(&format!("/api/products/{id}")).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        client.delete(&format!("/api/products/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.get(&format!("/api/products/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_product_validation() {
    let store = new_store();
    let mut client = logged_in_admin(&store).await;

    let mut body = new_product_body("BAD-1");
    body["price"] = json!(-5);
    body["name"] = json!("   ");
    let resp = client.post("/api/products", body).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json["error"], "Invalid input");
    let fields: Vec<&str> = resp.json["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["field"].as_str())
        .collect();
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"name"));

    let resp = client.post("/api/products", json!({ "name": "x" })).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST, "missing fields");

    let resp = client
        .put(
            "/api/products/00000000-0000-4000-8000-000000000000",
            json!({ "stock": 1 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inactive_products_hidden_from_storefront() {
    let store = new_store();
    let mut client = logged_in_admin(&store).await;

    let mut body = new_product_body("HIDDEN-1");
    body["isActive"] = json!(false);
    let resp = client.post("/api/products", body).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let id = resp.json["id"].as_str().unwrap().to_string();

    let listing = client.get("/api/products").await;
    assert_eq!(listing.json.as_array().map(Vec::len), Some(1));

    let mut shop = TestClient::new(storefront(store.clone()));
    assert_eq!(
        shop.get(&format!("/api/products/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        shop.get("/api/products").await.json.as_array().map(Vec::len),
        Some(0)
    );
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_order_listing_and_status() {
    let store = new_store();
    seed_catalog(store.as_ref()).await;
    let (first, _) = guest_order(&store, "IPH15P-128", "guest-one").await;
    let (second, _) = guest_order(&store, "SONY-WH1000XM5", "guest-two").await;
    let mut client = logged_in_admin(&store).await;

    let resp = client.get("/api/orders").await;
    assert_eq!(resp.json.as_array().map(Vec::len), Some(2));

    let resp = client
        .put(
            &format!("/api/orders/{first}/status"),
            json!({ "status": "shipped" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["status"], "shipped");

    let resp = client.get("/api/orders?status=shipped").await;
    let shipped = resp.json.as_array().unwrap();
    assert_eq!(shipped.len(), 1);
    assert_eq!(shipped[0]["id"], first.as_str());

    let resp = client
        .put(
            &format!("/api/orders/{second}/status"),
            json!({ "status": "teleported" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client.get(&format!("/api/orders/{second}")).await;
    assert_eq!(resp.json["status"], "processing");
}

#[tokio::test]
async fn test_refunds() {
    let store = new_store();
    seed_catalog(store.as_ref()).await;
    let (full, full_total) = guest_order(&store, "IPH15P-128", "guest-full").await;
    let (partial, partial_total) = guest_order(&store, "ASU-ROG-G15", "guest-partial").await;
    let mut client = logged_in_admin(&store).await;

    let resp = client.post_empty(&format!("/api/orders/{full}/refund")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["status"], "refunded");
    assert_eq!(decimal(&resp.json["refundAmount"]), full_total);
    assert!(!resp.json["refundedAt"].is_null());

    let too_much = partial_total + Decimal::ONE;
    let resp = client
        .post(
            &format!("/api/orders/{partial}/refund"),
            json!({ "amount": too_much.to_string() }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client
        .post(&format!("/api/orders/{partial}/refund"), json!({ "amount": 0 }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client
        .post(
            &format!("/api/orders/{partial}/refund"),
            json!({ "amount": 100.5 }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(decimal(&resp.json["refundAmount"]), "100.5".parse().unwrap());
}

#[tokio::test]
async fn test_delete_order() {
    let store = new_store();
    seed_catalog(store.as_ref()).await;
    let (order, _) = guest_order(&store, "DELL-XPS-DT", "guest-delete").await;
    let mut client = logged_in_admin(&store).await;

    let uri = format!("/api/orders/{order}");
    assert_eq!(client.delete(&uri).await.status, StatusCode::NO_CONTENT);
    assert_eq!(client.delete(&uri).await.status, StatusCode::NOT_FOUND);
    assert_eq!(client.get(&uri).await.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Reporting
// ============================================================================

#[tokio::test]
async fn test_stats_and_users() {
    let store = new_store();
    seed_catalog(store.as_ref()).await;
    let (_, total) = guest_order(&store, "IPH15P-128", "guest-stats").await;
    let mut client = logged_in_admin(&store).await;

    let resp = client.get("/api/admin/stats").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["totalProducts"], 6);
    assert_eq!(resp.json["ordersToday"], 1);
    assert_eq!(decimal(&resp.json["revenue"]), total);
    assert_eq!(resp.json["lowStock"], 1);

    let resp = client.get("/api/admin/users").await;
    let users = resp.json.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_analytics_refreshes_after_admin_writes() {
    let store = new_store();
    let mut client = logged_in_admin(&store).await;

    let resp = client.get("/api/admin/analytics").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["products"]["total"], 0);
    assert!(resp.json["revenueData"].is_array());

    client
        .post("/api/products", new_product_body("PIX9-256"))
        .await;

    let resp = client.get("/api/admin/analytics").await;
    assert_eq!(resp.json["products"]["total"], 1);
}
