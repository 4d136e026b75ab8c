use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::upload;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload::upload_file)
                .layer(DefaultBodyLimit::disable())
                .route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        )
        .route("/uploads/:file_name", get(upload::serve_upload))
}
