use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::health;
use crate::state::AppState;

pub mod auth;
pub mod checkout;
pub mod content;
pub mod orders;
pub mod products;
pub mod upload;

pub fn build_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state);

    let api = Router::new()
        .route("/health", get(health::health_check))
        .nest("/admin", auth::routes(app_state.clone()))
        .nest("/products", products::routes(app_state.clone()))
        .nest("/categories", products::category_routes())
        .nest("/lookbook", content::lookbook_routes(app_state.clone()))
        .nest("/videos", content::video_routes(app_state.clone()))
        .nest("/checkout", checkout::routes())
        .nest("/webhook", checkout::webhook_routes())
        .nest("/orders", orders::routes(app_state.clone()))
        .merge(upload::routes(app_state.clone()));

    // Mounted outside the nest so both "/api" and "/api/" reach the root.
    Router::new()
        .route("/api", get(health::root_handler))
        .route("/api/", get(health::root_handler))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if app_state.config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = app_state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(origins)
}
