use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::checkout;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(checkout::create_checkout_session))
        .route("/status/:session_id", get(checkout::get_checkout_status))
}

pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(checkout::stripe_webhook))
}
