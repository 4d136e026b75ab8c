use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::video::{CreateVideo, UpdateVideo, Video, VideoQuery};
use crate::state::AppState;

pub async fn get_videos(
    State(state): State<AppState>,
    Query(query): Query<VideoQuery>,
) -> Result<Json<Vec<Video>>> {
    Ok(Json(state.store.list_videos(query.active_only).await?))
}

pub async fn create_video(
    State(state): State<AppState>,
    Json(payload): Json<CreateVideo>,
) -> Result<(StatusCode, Json<Video>)> {
    payload.validate()?;

    let video = Video::from(payload);
    state.store.insert_video(&video).await?;
    tracing::info!("Video {} created", video.id);

    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateVideo>,
) -> Result<Json<Video>> {
    if payload.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    payload.validate()?;

    state
        .store
        .update_video(&id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Video"))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    if !state.store.delete_video(&id).await? {
        return Err(AppError::not_found("Video"));
    }

    Ok(Json(json!({ "message": "Video deleted successfully" })))
}
