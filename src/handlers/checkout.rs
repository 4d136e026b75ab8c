use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{json, Value};
use tracing::{error, info, warn};
use validator::Validate;

use crate::dtos::checkout_dtos::{CheckoutRequest, CheckoutResponse, CheckoutStatusResponse};
use crate::errors::{AppError, Result};
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";

pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    payload.validate()?;
    info!("Checkout requested for {} cart lines", payload.items.len());

    let response = state.checkout.create_session(payload).await?;
    Ok(Json(response))
}

pub async fn get_checkout_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CheckoutStatusResponse>> {
    let status = state.checkout.check_status(&session_id).await?;
    Ok(Json(status))
}

/// Provider callback. Errors are reported in the response body and never
/// raised, so the provider simply retries on a non-2xx status.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("Webhook received without {} header", SIGNATURE_HEADER);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "Missing webhook signature" })),
        );
    };

    let event = match state.payments.parse_webhook(&body, signature) {
        Ok(event) => event,
        Err(e) => {
            warn!("Webhook rejected: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "message": e.to_string() })),
            );
        }
    };

    let Some(kind) = event.session_event() else {
        info!("Ignoring webhook {}", event.event_type);
        return (StatusCode::OK, Json(json!({ "status": "ignored" })));
    };

    let session = match event.checkout_session() {
        Ok(session) => session,
        Err(e) => {
            warn!("Webhook {} rejected: {}", event.event_type, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "status": "error", "message": e.to_string() })),
            );
        }
    };

    info!("Webhook {} for session {}", event.event_type, session.session_id);

    match state.checkout.apply_event(kind, &session).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({ "status": "success", "outcome": format!("{:?}", outcome) })),
        ),
        Err(e) => {
            error!(
                "Webhook reconciliation for session {} failed: {}",
                session.session_id, e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": error_message(&e) })),
            )
        }
    }
}

fn error_message(err: &AppError) -> String {
    match err {
        AppError::MongoDB(_) | AppError::BsonSerialization(_) => "Database error".to_string(),
        other => other.to_string(),
    }
}
