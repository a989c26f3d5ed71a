//! Integration tests for customer accounts: registration, login and profile.

use axum::http::StatusCode;
use techmart_integration_tests::{
    TestClient, by_sku, checkout_body, json, new_store, seed_catalog, storefront,
};

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
async fn test_register_signs_in() {
    let store = new_store();
    let mut client = TestClient::new(storefront(store.clone()));

    let resp = client.get("/api/auth/me").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = client
        .post(
            "/api/auth/register",
            json!({ "email": "Grace@Example.com", "password": "secret1", "name": "Grace" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.json["user"]["email"], "grace@example.com");
    assert_eq!(resp.json["user"]["isAdmin"], false);
    assert!(resp.json["user"].get("passwordHash").is_none());

    let resp = client.get("/api/auth/me").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["user"]["name"], "Grace");
}

#[tokio::test]
async fn test_register_validation() {
    let store = new_store();
    let mut client = TestClient::new(storefront(store.clone()));

    let resp = client
        .post("/api/auth/register", json!({ "password": "secret1", "name": "X" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json["error"], "Email is required");

    let resp = client
        .post("/api/auth/register", json!({ "email": "x@example.com", "name": "X" }))
        .await;
    assert_eq!(resp.json["error"], "Password is required");

    let resp = client
        .post(
            "/api/auth/register",
            json!({ "email": "x@example.com", "password": "abc", "name": "X" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST, "short password");

    let resp = client
        .post(
            "/api/auth/register",
            json!({ "email": "not-an-email", "password": "secret1", "name": "X" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let store = new_store();
    let body = json!({ "email": "dup@example.com", "password": "secret1", "name": "Dup" });

    let mut first = TestClient::new(storefront(store.clone()));
    assert_eq!(
        first.post("/api/auth/register", body.clone()).await.status,
        StatusCode::CREATED
    );

    let mut second = TestClient::new(storefront(store.clone()));
    let resp = second.post("/api/auth/register", body).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_and_logout() {
    let store = new_store();
    let mut client = TestClient::new(storefront(store.clone()));
    client
        .post(
            "/api/auth/register",
            json!({ "email": "lin@example.com", "password": "secret1", "name": "Lin" }),
        )
        .await;

    let resp = client.post_empty("/api/auth/logout").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["ok"], true);
    assert_eq!(client.get("/api/auth/me").await.status, StatusCode::UNAUTHORIZED);

    let resp = client
        .post(
            "/api/auth/login",
            json!({ "email": "lin@example.com", "password": "wrong-pass" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json["error"], "Invalid email or password");

    let resp = client
        .post(
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = client
        .post(
            "/api/auth/login",
            json!({ "email": "LIN@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["user"]["email"], "lin@example.com");
    assert_eq!(client.get("/api/auth/me").await.status, StatusCode::OK);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_requires_login() {
    let store = new_store();
    let mut client = TestClient::new(storefront(store.clone()));

    assert_eq!(client.get("/api/profile").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        client.get("/api/user/orders").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_update_profile_and_address() {
    let store = new_store();
    let mut client = TestClient::new(storefront(store.clone()));
    client
        .post(
            "/api/auth/register",
            json!({ "email": "pat@example.com", "password": "secret1", "name": "Pat" }),
        )
        .await;

    let resp = client
        .put(
            "/api/profile",
            json!({ "name": "  Pat Doe ", "phone": "555-0199" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["name"], "Pat Doe");
    assert_eq!(resp.json["phone"], "555-0199");

    let resp = client.put("/api/profile", json!({ "phone": "" })).await;
    assert!(resp.json["phone"].is_null(), "blank phone clears it");
    assert_eq!(resp.json["name"], "Pat Doe");

    let resp = client
        .put(
            "/api/profile/address",
            json!({ "address": "1 Main St", "city": "Springfield", "state": "IL", "zipCode": "" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = client
        .put(
            "/api/profile/address",
            json!({ "address": "1 Main St", "city": "Springfield", "state": "IL", "zipCode": "62701" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json["shippingAddress"]["zipCode"], "62701");
    assert_eq!(resp.json["shippingAddress"]["country"], "United States");

    let resp = client.get("/api/profile").await;
    assert_eq!(resp.json["shippingAddress"]["city"], "Springfield");
}

#[tokio::test]
async fn test_order_history_lists_own_orders() {
    let store = new_store();
    let products = seed_catalog(store.as_ref()).await;
    let phone = by_sku(&products, "IPH15P-128");

    let mut client = TestClient::new(storefront(store.clone()));
    client
        .post(
            "/api/auth/register",
            json!({ "email": "hist@example.com", "password": "secret1", "name": "Hist" }),
        )
        .await;
    assert_eq!(
        client.get("/api/user/orders").await.json.as_array().map(Vec::len),
        Some(0)
    );

    for _ in 0..2 {
        client
            .post("/api/cart", json!({ "productId": phone.id.to_string() }))
            .await;
        let resp = client
            .post("/api/checkout", checkout_body("hist@example.com"))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }

    // A guest order elsewhere does not show up
    let mut guest =
        TestClient::new(storefront(store.clone())).with_header("x-session-id", "guest-history");
    guest
        .post("/api/cart", json!({ "productId": phone.id.to_string() }))
        .await;
    guest
        .post("/api/checkout", checkout_body("guest@example.com"))
        .await;

    let resp = client.get("/api/user/orders").await;
    assert_eq!(resp.status, StatusCode::OK);
    let orders = resp.json.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["userId"] == resp.json[0]["userId"]));
    assert!(!orders[0]["userId"].is_null());
}
