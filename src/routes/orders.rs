use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::handlers::orders;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(orders::get_orders))
        .route("/:id/status", put(orders::update_order_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    // Public so the checkout success page can show the order.
    Router::new()
        .route("/:id", get(orders::get_order))
        .merge(admin)
}
