//! Registration and login endpoints.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use crate::error::AppError;
use crate::validation::{sanitize_string, validate_email, validate_required};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = sanitize_string(&payload.username.unwrap_or_default());
    let email = sanitize_string(&payload.email.unwrap_or_default());

    validate_required("username", &username)?;
    validate_email(&email)?;

    // Checked up front for a clear message; the unique constraints still
    // back this up under concurrent registrations.
    let taken = state.store.get_account_by_username(&username).await?.is_some()
        || state.store.get_account_by_email(&email).await?.is_some();
    if taken {
        return Err(AppError::Conflict(
            "Username or email already exists".to_string(),
        ));
    }

    state.store.create_account(&username, &email).await?;

    let token = state
        .tokens
        .issue_user(&username, &email)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("registered user {} ({})", username, email);

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful",
        "token": token,
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload.username.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let token = payload.token.unwrap_or_default();

    validate_required("username", &username)?;
    validate_required("email", &email)?;
    validate_required("token", &token)?;

    let claims = state
        .tokens
        .verify_user(&token)
        .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    if claims.username != username || claims.email != email {
        return Err(AppError::Unauthorized(
            "Token does not match provided username and email".to_string(),
        ));
    }

    if state
        .store
        .get_account_by_username(&username)
        .await?
        .is_none()
    {
        return Err(AppError::Unauthorized("User not found".to_string()));
    }

    tracing::info!("user logged in: {} ({})", username, email);

    Ok(Json(json!({
        "success": true,
        "user": { "username": username, "email": email },
    })))
}

#[derive(Debug, Deserialize)]
pub struct AlternativeLoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Credential-less login that provisions the account on first use.
/// Deliberate policy, not an oversight: purchase-history access for
/// unregistered players depends on it.
pub async fn login_alternative(
    State(state): State<AppState>,
    Json(payload): Json<AlternativeLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = sanitize_string(&payload.username.unwrap_or_default());
    let email = sanitize_string(&payload.email.unwrap_or_default());

    validate_required("username", &username)?;
    validate_required("email", &email)?;

    if state
        .store
        .get_account_by_username(&username)
        .await?
        .is_none()
    {
        state.store.create_account(&username, &email).await?;
        tracing::info!("created new user: {} ({})", username, email);
    }

    tracing::info!("alternative login for {} ({})", username, email);

    Ok(Json(json!({
        "success": true,
        "user": { "username": username, "email": email },
    })))
}
