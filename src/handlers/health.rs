use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Storefront API",
        "status": "running",
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "service": "storefront-api",
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
