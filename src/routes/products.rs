use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::products;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(products::create_product))
        .route(
            "/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(products::get_products))
        .route("/:id", get(products::get_product))
        .merge(admin)
}

pub fn category_routes() -> Router<AppState> {
    Router::new().route("/", get(products::get_categories))
}
