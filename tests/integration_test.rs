//! End-to-end tests for the public storefront API, run against an
//! in-process server backed by the in-memory store.

use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

use realms_shop::config::Config;
use realms_shop::db::memory::MemoryStore;
use realms_shop::{AppState, create_app};

fn test_config() -> Config {
    Config {
        server_port: 0,
        database_url: "postgres://unused".to_string(),
        admin_password: "hunter2".to_string(),
        jwt_secret: "test-secret".to_string(),
        discord_webhook_url: None,
        discord_staff_role_id: None,
        // Nothing listens here; USD display prices degrade to absent.
        exchange_rate_url: "http://127.0.0.1:9/v4/latest/NPR".to_string(),
    }
}

async fn spawn_app() -> String {
    let state = AppState::new(Arc::new(MemoryStore::new()), test_config());
    let app = create_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn admin_token(client: &reqwest::Client, base_url: &str) -> String {
    let res = client
        .post(format!("{}/api/admin/login", base_url))
        .json(&json!({ "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_connected_store() {
    let base_url = spawn_app().await;
    let res = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn register_then_login_round_trips() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/register", base_url))
        .json(&json!({ "username": "steve", "email": "steve@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    let token = body["token"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/login", base_url))
        .json(&json!({
            "username": "steve",
            "email": "steve@example.com",
            "token": token,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["username"], "steve");
}

#[tokio::test]
async fn duplicate_username_or_email_is_rejected() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/register", base_url))
        .json(&json!({ "username": "steve", "email": "steve@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Same username, fresh email.
    let res = client
        .post(format!("{}/api/register", base_url))
        .json(&json!({ "username": "steve", "email": "other@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Same email, fresh username.
    let res = client
        .post(format!("{}/api/register", base_url))
        .json(&json!({ "username": "alex", "email": "steve@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_rejects_bad_email_and_missing_fields() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/register", base_url))
        .json(&json!({ "username": "steve", "email": "not-an-email" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/api/register", base_url))
        .json(&json!({ "email": "steve@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_mismatched_token_fails() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/register", base_url))
        .json(&json!({ "username": "steve", "email": "steve@example.com" }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // Token was issued for steve, presented as alex.
    let res = client
        .post(format!("{}/api/login", base_url))
        .json(&json!({
            "username": "alex",
            "email": "steve@example.com",
            "token": token,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/login", base_url))
        .json(&json!({
            "username": "steve",
            "email": "steve@example.com",
            "token": "garbage",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn alternative_login_provisions_an_account() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/login-alternative", base_url))
        .json(&json!({ "username": "newplayer", "email": "new@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["username"], "newplayer");

    // The account must exist afterwards.
    let token = admin_token(&client, &base_url).await;
    let res = client
        .get(format!("{}/api/admin/users", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert!(users.iter().any(|u| u["username"] == "newplayer"));

    // Logging in again is still fine.
    let res = client
        .post(format!("{}/api/login-alternative", base_url))
        .json(&json!({ "username": "newplayer", "email": "new@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn checkout_missing_fields_writes_nothing() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    // No transactionId.
    let res = client
        .post(format!("{}/api/process-payment", base_url))
        .json(&json!({
            "method": "esewa",
            "username": "steve",
            "amount": "100",
            "items": [{ "id": "vip", "quantity": 1, "priceNPR": 100 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Empty cart.
    let res = client
        .post(format!("{}/api/process-payment", base_url))
        .json(&json!({
            "method": "esewa",
            "transactionId": "TXN1",
            "username": "steve",
            "amount": "100",
            "items": [],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown provider.
    let res = client
        .post(format!("{}/api/process-payment", base_url))
        .json(&json!({
            "method": "stripe",
            "transactionId": "TXN1",
            "username": "steve",
            "amount": "100",
            "items": [{ "id": "vip", "quantity": 1, "priceNPR": 100 }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let token = admin_token(&client, &base_url).await;
    let res = client
        .get(format!("{}/api/admin/purchases", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert!(body["purchases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn purchase_history_requires_identity() {
    let base_url = spawn_app().await;
    let res = reqwest::get(format!("{}/api/purchase-history", base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn purchase_history_accepts_alternative_headers() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/process-payment", base_url))
        .json(&json!({
            "method": "khalti",
            "transactionId": "TXN9",
            "username": "steve",
            "amount": "130",
            "items": [
                { "id": "vip", "name": "VIP Rank", "quantity": 1, "priceNPR": 100 },
                { "id": "manaslu-key", "name": "Manaslu Key", "quantity": 1, "priceNPR": 30 },
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/purchase-history", base_url))
        .header("x-username", "steve")
        .header("x-email", "steve@example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let purchases = body["purchases"].as_array().unwrap();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0]["status"], "unverified");
    assert_eq!(purchases[0]["items"].as_array().unwrap().len(), 2);

    // Someone else's history is empty.
    let res = client
        .get(format!("{}/api/purchase-history", base_url))
        .header("x-username", "alex")
        .header("x-email", "alex@example.com")
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert!(body["purchases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn popular_items_sums_quantities_across_purchases() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    for (txn, items) in [
        ("TXN1", json!([{ "id": "vip", "quantity": 2, "priceNPR": 100 }])),
        (
            "TXN2",
            json!([
                { "id": "vip", "quantity": 1, "priceNPR": 100 },
                { "id": "coins-1000", "quantity": 5, "priceNPR": 100 },
            ]),
        ),
    ] {
        let res = client
            .post(format!("{}/api/process-payment", base_url))
            .json(&json!({
                "method": "esewa",
                "transactionId": txn,
                "username": "steve",
                "amount": "100",
                "items": items,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = reqwest::get(format!("{}/api/popular-items", base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let popular = body["popular"].as_array().unwrap();
    assert_eq!(popular[0]["id"], "coins-1000");
    assert_eq!(popular[0]["count"], 5);
    assert_eq!(popular[1]["id"], "vip");
    assert_eq!(popular[1]["count"], 3);
}

#[tokio::test]
async fn products_reflect_current_discounts() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &base_url).await;

    let res = client
        .post(format!("{}/api/admin/apply-product-sale", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "productId": "vip", "percentage": 20 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = reqwest::get(format!("{}/api/products", base_url))
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let products = body["products"].as_array().unwrap();
    let vip = products.iter().find(|p| p["id"] == "vip").unwrap();
    assert_eq!(vip["price_npr"], 80);
    assert_eq!(vip["original_price_npr"], 100);
    assert_eq!(vip["sale_percentage"], 20);
    // Rate source is unreachable in tests; USD display is absent.
    assert!(vip.get("price_usd").is_none());

    let mvp = products.iter().find(|p| p["id"] == "mvp").unwrap();
    assert_eq!(mvp["price_npr"], 200);
    assert!(mvp.get("sale_percentage").is_none());
}
