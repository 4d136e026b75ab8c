use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::product::{
    Category, CategoryInfo, CreateProduct, Product, ProductQuery, UpdateProduct,
};
use crate::state::AppState;

pub async fn get_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    tracing::debug!("GET /api/products {:?}", query);
    let products = state.store.list_products(&query).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    state
        .store
        .get_product(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Product"))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    payload.validate()?;

    let product = Product::from(payload);
    state.store.insert_product(&product).await?;
    tracing::info!("Product {} created: {}", product.id, product.name);

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    if payload.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    payload.validate()?;

    let product = state
        .store
        .update_product(&id, &payload)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    tracing::info!("Product {} updated", product.id);
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    if !state.store.delete_product(&id).await? {
        return Err(AppError::not_found("Product"));
    }

    tracing::info!("Product {} deleted", id);
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

pub async fn get_categories() -> Json<Value> {
    let categories: Vec<CategoryInfo> = Category::ALL.into_iter().map(CategoryInfo::from).collect();
    Json(json!({ "categories": categories }))
}
