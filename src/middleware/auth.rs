//! Bearer-token gate in front of every admin route.
//!
//! Admin login hands out a short-lived token; nothing here trusts the
//! client to have gated its own UI.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::AppError;

pub async fn admin_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing admin credentials".to_string()))?;

    state
        .tokens
        .verify_admin(token)
        .map_err(|e| AppError::Unauthorized(format!("Invalid admin credentials: {}", e)))?;

    Ok(next.run(req).await)
}
