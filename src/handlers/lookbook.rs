use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::lookbook::{CreateLookbookItem, LookbookItem, UpdateLookbookItem};
use crate::state::AppState;

pub async fn get_lookbook(State(state): State<AppState>) -> Result<Json<Vec<LookbookItem>>> {
    Ok(Json(state.store.list_lookbook().await?))
}

pub async fn create_lookbook_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateLookbookItem>,
) -> Result<(StatusCode, Json<LookbookItem>)> {
    payload.validate()?;

    let item = LookbookItem::from(payload);
    state.store.insert_lookbook_item(&item).await?;
    tracing::info!("Lookbook item {} created", item.id);

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_lookbook_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLookbookItem>,
) -> Result<Json<LookbookItem>> {
    if payload.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    payload.validate()?;

    state
        .store
        .update_lookbook_item(&id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Lookbook item"))
}

pub async fn delete_lookbook_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    if !state.store.delete_lookbook_item(&id).await? {
        return Err(AppError::not_found("Lookbook item"));
    }

    Ok(Json(json!({ "message": "Lookbook item deleted successfully" })))
}
