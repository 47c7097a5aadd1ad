//! Public storefront endpoints: catalog, checkout, history, popularity.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::AppState;
use crate::catalog::{self, Category};
use crate::db::models::{Provider, Purchase, PurchaseItem};
use crate::error::AppError;
use crate::pricing::DiscountSnapshot;
use crate::services::rates::usd_display;
use crate::validation::{
    ValidationError, validate_positive_amount, validate_quantity, validate_required,
};

#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: &'static str,
    pub category: Category,
    pub name: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    /// Effective price with any active sale applied.
    pub price_npr: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price_npr: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_percentage: Option<u8>,
}

pub(crate) fn product_views(
    discounts: &DiscountSnapshot,
    usd_per_npr: Option<f64>,
) -> Vec<ProductView> {
    catalog::all_items()
        .iter()
        .map(|item| {
            let percentage = discounts.percentage_for(item.id);
            let price_npr = discounts.effective_price(item);
            ProductView {
                id: item.id,
                category: item.category,
                name: item.name,
                description: item.description,
                image: item.image,
                price_npr,
                price_usd: usd_display(price_npr, usd_per_npr),
                original_price_npr: percentage.map(|_| item.base_price),
                sale_percentage: percentage,
            }
        })
        .collect()
}

pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let discounts = state.overlay.snapshot().await;
    let usd_per_npr = state.rates.usd_per_npr().await;

    Json(json!({ "products": product_views(&discounts, usd_per_npr) }))
}

#[derive(Debug, Deserialize)]
pub struct SubmittedItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, alias = "priceNPR")]
    pub unit_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, rename = "transactionId")]
    pub transaction_id: Option<String>,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<SubmittedItem>>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The storefront sends the amount either as a JSON number or as a
/// pre-formatted string; accept both.
fn parse_amount(raw: &Value) -> Result<BigDecimal, ValidationError> {
    let parsed = match raw {
        Value::String(s) => s.trim().parse::<BigDecimal>().ok(),
        Value::Number(n) => n.to_string().parse::<BigDecimal>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| ValidationError::new("amount", "must be a decimal number"))
}

pub async fn process_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ProcessPaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let method = payload.method.unwrap_or_default();
    let transaction_id = payload.transaction_id.unwrap_or_default();
    let username = payload.username.unwrap_or_default();

    validate_required("method", &method)?;
    validate_required("transactionId", &transaction_id)?;
    validate_required("username", &username)?;

    let provider: Provider = method.parse().map_err(AppError::Validation)?;

    let raw_amount = payload
        .amount
        .ok_or_else(|| ValidationError::new("amount", "must not be empty"))?;
    let amount = parse_amount(&raw_amount)?;
    validate_positive_amount(&amount)?;

    let submitted = payload.items.unwrap_or_default();
    if submitted.is_empty() {
        return Err(ValidationError::new("items", "must not be empty").into());
    }

    // Snapshot the cart exactly as submitted; the recorded amount and
    // prices never change with later catalog or discount edits. The
    // client-supplied amount is trusted as authoritative at write time.
    let mut items = Vec::with_capacity(submitted.len());
    for line in submitted {
        let id = line.id.unwrap_or_default();
        let quantity = line.quantity.unwrap_or(1);
        validate_quantity(quantity)?;

        let name = line
            .name
            .or_else(|| catalog::find_item(&id).map(|it| it.name.to_string()))
            .unwrap_or_else(|| id.clone());

        items.push(PurchaseItem {
            id,
            name,
            quantity,
            unit_price: line.unit_price.unwrap_or(0),
        });
    }

    let submitted_at = payload
        .timestamp
        .as_deref()
        .and_then(|ts| ts.parse::<DateTime<Utc>>().ok());

    let ip = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .unwrap_or_default()
        .trim()
        .to_string();

    let purchase = Purchase::new(
        username.clone(),
        payload.email.unwrap_or_default(),
        items,
        amount,
        provider,
        transaction_id,
        payload.phone_number.unwrap_or_default(),
        payload.currency.unwrap_or_else(|| "NPR".to_string()),
        ip,
        submitted_at,
    );

    state.store.insert_purchase(&purchase).await?;

    // Fire-and-forget; a lost notification never fails the checkout.
    state.notifier.purchase_created(&purchase).await;

    tracing::info!(
        "purchase {} created for {}: {} item(s), status unverified",
        purchase.id,
        username,
        purchase.items.len()
    );

    Ok(Json(json!({
        "success": true,
        "message": "Payment submitted successfully. Awaiting verification.",
    })))
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    id: uuid::Uuid,
    timestamp: DateTime<Utc>,
    total: BigDecimal,
    status: crate::db::models::PurchaseStatus,
    items: Vec<PurchaseItem>,
}

/// Resolves the requesting player from a Bearer token, falling back to the
/// alternative-login headers, which are trusted as-is by policy.
fn requester_username(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        match state.tokens.verify_user(token) {
            Ok(claims) => return Some(claims.username),
            Err(e) => tracing::warn!("purchase-history token rejected: {}", e),
        }
    }

    let alt_username = headers.get("x-username").and_then(|h| h.to_str().ok());
    let alt_email = headers.get("x-email").and_then(|h| h.to_str().ok());
    match (alt_username, alt_email) {
        (Some(username), Some(_)) => Some(username.to_string()),
        _ => None,
    }
}

pub async fn purchase_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let username = requester_username(&state, &headers).ok_or_else(|| {
        AppError::Unauthorized("Please login to view your purchase history".to_string())
    })?;

    let purchases = state.store.list_purchases().await?;
    let history: Vec<HistoryEntry> = purchases
        .into_iter()
        .filter(|p| p.username == username)
        .map(|p| HistoryEntry {
            id: p.id,
            timestamp: p.created_at,
            total: p.amount,
            status: p.status,
            items: p.items,
        })
        .collect();

    Ok(Json(json!({ "purchases": history })))
}

pub async fn popular_items(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let purchases = state.store.list_purchases().await?;

    let mut counts: HashMap<String, i64> = HashMap::new();
    for purchase in &purchases {
        for item in &purchase.items {
            if item.id.is_empty() {
                continue;
            }
            let quantity = if item.quantity >= 1 { item.quantity } else { 1 };
            *counts.entry(item.id.clone()).or_insert(0) += quantity;
        }
    }

    let mut popular: Vec<(String, i64)> = counts.into_iter().collect();
    popular.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    popular.truncate(5);

    let popular: Vec<Value> = popular
        .into_iter()
        .map(|(id, count)| json!({ "id": id, "count": count }))
        .collect();

    Ok(Json(json!({ "popular": popular })))
}
