use axum::{extract::State, response::Json, Extension};
use serde_json::{json, Value};

use crate::errors::{AppError, Result};
use crate::models::auth::{AdminLogin, Claims, TokenResponse};
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLogin>,
) -> Result<Json<TokenResponse>> {
    let config = &state.config;
    if payload.username != config.admin_username || payload.password != config.admin_password {
        tracing::warn!("Failed admin login for '{}'", payload.username);
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(&payload.username)?;
    tracing::info!("🔑 Admin '{}' logged in", payload.username);

    Ok(Json(TokenResponse {
        token,
        message: "Login successful".to_string(),
    }))
}

pub async fn verify(Extension(claims): Extension<Claims>) -> Json<Value> {
    Json(json!({
        "valid": true,
        "username": claims.username,
    }))
}
