//! Order handlers.
//!
//! Placing an order converts the authenticated user's cart; everything else
//! is ownership-scoped reads plus the admin-only status update.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use paperback_core::{OrderId, OrderItemId, OrderStatus};

use super::Pagination;
use super::books::not_found_as_entity;
use crate::db::orders::OrderRepository;
use crate::error::{ApiError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::order::{OrderItemResponse, OrderResponse};
use crate::state::AppState;

/// Request body for `PATCH /api/orders/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `POST /api/orders`
///
/// Converts the user's cart into an order and empties the cart. An empty or
/// absent cart is a 400, not a 404.
pub async fn place(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let (order, items) = OrderRepository::new(state.pool()).place_order(&user).await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.id,
        total = %order.total,
        "order placed"
    );

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::from_order(order, items)),
    ))
}

/// `GET /api/orders`
pub async fn list(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<OrderResponse>>> {
    let repo = OrderRepository::new(state.pool());
    let orders = repo
        .list_by_user(user.id, pagination.limit(), pagination.offset())
        .await?;

    let mut responses = Vec::with_capacity(orders.len());
    for order in orders {
        let items = repo.items(order.id).await?;
        responses.push(OrderResponse::from_order(order, items));
    }

    Ok(Json(responses))
}

/// `GET /api/orders/{id}`
pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_for_user(user.id, id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "order", id: id.as_i64() })?;
    let items = repo.items(order.id).await?;

    Ok(Json(OrderResponse::from_order(order, items)))
}

/// `GET /api/orders/{id}/items`
pub async fn items(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<OrderItemResponse>>> {
    let repo = OrderRepository::new(state.pool());
    repo.get_for_user(user.id, id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "order", id: id.as_i64() })?;

    let items = repo.items(id).await?;

    Ok(Json(items.into_iter().map(OrderItemResponse::from).collect()))
}

/// `GET /api/orders/{id}/items/{item_id}`
pub async fn get_item(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path((id, item_id)): Path<(OrderId, OrderItemId)>,
) -> Result<Json<OrderItemResponse>> {
    let repo = OrderRepository::new(state.pool());
    repo.get_for_user(user.id, id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "order", id: id.as_i64() })?;

    let item = repo
        .get_item(id, item_id)
        .await?
        .ok_or(ApiError::EntityNotFound {
            kind: "order item",
            id: item_id.as_i64(),
        })?;

    Ok(Json(OrderItemResponse::from(item)))
}

/// `PATCH /api/orders/{id}` (admin)
///
/// Any known status may replace any other; there is no transition matrix.
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .update_status(id, request.status)
        .await
        .map_err(|e| not_found_as_entity(e, "order", id.as_i64()))?;
    let items = repo.items(order.id).await?;

    tracing::info!(order_id = %id, status = %request.status, "order status updated");

    Ok(Json(OrderResponse::from_order(order, items)))
}
