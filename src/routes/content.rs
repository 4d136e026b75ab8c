use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{lookbook, videos};
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn lookbook_routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(lookbook::create_lookbook_item))
        .route(
            "/:id",
            put(lookbook::update_lookbook_item).delete(lookbook::delete_lookbook_item),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(lookbook::get_lookbook))
        .merge(admin)
}

pub fn video_routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", post(videos::create_video))
        .route("/:id", put(videos::update_video).delete(videos::delete_video))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(videos::get_videos))
        .merge(admin)
}
