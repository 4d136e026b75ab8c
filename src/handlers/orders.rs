use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use crate::errors::{AppError, Result};
use crate::models::order::{Order, OrderQuery, OrderStatus, PaymentStatus, UpdateOrderStatus};
use crate::state::AppState;

pub async fn get_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.store.list_orders(&query).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    state
        .store
        .get_order(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order"))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateOrderStatus>,
) -> Result<Json<Order>> {
    let order = state
        .store
        .get_order(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    if !order.status.can_transition_to(payload.status) {
        return Err(AppError::bad_request(format!(
            "Cannot move order from {} to {}",
            order.status.as_str(),
            payload.status.as_str()
        )));
    }

    let payment_status = if payload.status == OrderStatus::Paid {
        PaymentStatus::Paid
    } else {
        order.payment_status
    };

    let updated = state
        .store
        .set_order_status(&id, payload.status, payment_status)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    tracing::info!(
        "Order {} moved {} -> {}",
        id,
        order.status.as_str(),
        updated.status.as_str()
    );
    Ok(Json(updated))
}
