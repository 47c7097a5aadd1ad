//! Admin panel endpoints.
//!
//! `login` is the only open route; everything else sits behind the bearer
//! middleware in [`crate::middleware::auth`]. Failures all render as
//! `{"ok": false, "error": ...}` with a log line.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::db::VerifyOutcome;
use crate::error::AppError;
use crate::validation::{validate_percentage, validate_required};

/// Admin-flavoured error rendering: same taxonomy, `{ok: false}` body.
pub struct AdminError(AppError);

impl<E: Into<AppError>> From<E> for AdminError {
    fn from(err: E) -> Self {
        AdminError(err.into())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!("admin request failed: {}", self.0);
        }

        let body = Json(json!({
            "ok": false,
            "error": self.0.public_message(),
        }));

        (status, body).into_response()
    }
}

type AdminResult = Result<Json<serde_json::Value>, AdminError>;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> AdminResult {
    if payload.password.as_deref() != Some(state.config.admin_password.as_str()) {
        return Err(AppError::Unauthorized("Invalid admin password".to_string()).into());
    }

    let token = state
        .tokens
        .issue_admin()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("admin logged in");

    Ok(Json(json!({ "ok": true, "token": token })))
}

pub async fn list_users(State(state): State<AppState>) -> AdminResult {
    let users = state.store.list_accounts().await?;
    Ok(Json(json!({ "ok": true, "users": users })))
}

pub async fn list_purchases(State(state): State<AppState>) -> AdminResult {
    let purchases = state.store.list_purchases().await?;
    Ok(Json(json!({ "ok": true, "purchases": purchases })))
}

pub async fn list_products(State(state): State<AppState>) -> AdminResult {
    let discounts = state.overlay.snapshot().await;
    let usd_per_npr = state.rates.usd_per_npr().await;

    Ok(Json(json!({
        "ok": true,
        "products": super::shop::product_views(&discounts, usd_per_npr),
    })))
}

pub async fn product_sales(State(state): State<AppState>) -> AdminResult {
    let sales = state.overlay.product_sales().await;
    Ok(Json(json!({ "ok": true, "sales": sales })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyPurchaseRequest {
    #[serde(default, rename = "purchaseId")]
    pub purchase_id: Option<String>,
}

pub async fn verify_purchase(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPurchaseRequest>,
) -> AdminResult {
    let raw_id = payload.purchase_id.unwrap_or_default();
    validate_required("purchaseId", &raw_id)?;

    // An unparseable id cannot name a purchase; same failure as unknown.
    let id = Uuid::parse_str(raw_id.trim())
        .map_err(|_| AppError::NotFound("purchase not found".to_string()))?;

    match state.store.verify_purchase(id).await? {
        VerifyOutcome::Verified(purchase) => {
            state.notifier.purchase_verified(&purchase).await;
            tracing::info!("purchase {} verified", purchase.id);
            Ok(Json(json!({ "ok": true })))
        }
        // Terminal already; repeat calls succeed without re-notifying.
        VerifyOutcome::AlreadyVerified(_) => Ok(Json(json!({ "ok": true }))),
        VerifyOutcome::NotFound => {
            Err(AppError::NotFound("purchase not found".to_string()).into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GlobalSaleRequest {
    #[serde(default)]
    pub percentage: Option<i64>,
}

pub async fn apply_global_sale(
    State(state): State<AppState>,
    Json(payload): Json<GlobalSaleRequest>,
) -> AdminResult {
    let percentage = validate_percentage(payload.percentage.unwrap_or(-1))?;
    state.overlay.set_global(percentage).await;

    Ok(Json(json!({
        "ok": true,
        "message": format!("Applied {}% sale to all products", percentage),
    })))
}

pub async fn remove_global_sale(State(state): State<AppState>) -> AdminResult {
    state.overlay.clear_global().await;

    Ok(Json(json!({
        "ok": true,
        "message": "Removed sale from all products",
    })))
}

#[derive(Debug, Deserialize)]
pub struct ProductSaleRequest {
    #[serde(default, rename = "productId")]
    pub product_id: Option<String>,
    #[serde(default)]
    pub percentage: Option<i64>,
}

pub async fn apply_product_sale(
    State(state): State<AppState>,
    Json(payload): Json<ProductSaleRequest>,
) -> AdminResult {
    let product_id = payload.product_id.unwrap_or_default();
    validate_required("productId", &product_id)?;
    let percentage = validate_percentage(payload.percentage.unwrap_or(-1))?;

    state.overlay.set_product(&product_id, percentage).await;

    Ok(Json(json!({
        "ok": true,
        "message": format!("Applied {}% sale to product", percentage),
    })))
}

#[derive(Debug, Deserialize)]
pub struct RemoveProductSaleRequest {
    #[serde(default, rename = "productId")]
    pub product_id: Option<String>,
}

pub async fn remove_product_sale(
    State(state): State<AppState>,
    Json(payload): Json<RemoveProductSaleRequest>,
) -> AdminResult {
    let product_id = payload.product_id.unwrap_or_default();
    validate_required("productId", &product_id)?;

    state.overlay.clear_product(&product_id).await;

    Ok(Json(json!({
        "ok": true,
        "message": "Removed sale from product",
    })))
}

pub async fn clear_database(State(state): State<AppState>) -> AdminResult {
    state.store.clear_all().await?;
    tracing::info!("database cleared by admin");

    Ok(Json(json!({
        "ok": true,
        "message": "Database cleared successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct AnnounceRequest {
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn announce(
    State(state): State<AppState>,
    Json(payload): Json<AnnounceRequest>,
) -> AdminResult {
    let message = payload.message.unwrap_or_default();
    validate_required("message", &message)?;

    tracing::info!("admin announcement: {}", message);
    state.notifier.announce(&message).await;

    Ok(Json(json!({ "ok": true })))
}
