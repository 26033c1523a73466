//! Shopping cart handlers.
//!
//! All cart routes act on the authenticated user's own cart. Line lookups are
//! ownership-scoped in the repository, so another user's line ids behave
//! exactly like nonexistent ones.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use paperback_core::{BookId, CartItemId};

use crate::db::books::BookRepository;
use crate::db::carts::CartRepository;
use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::cart::{CartItemResponse, CartResponse};
use crate::state::AppState;

/// Request body for adding a book to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub book_id: BookId,
    pub quantity: i32,
}

/// Request body for setting a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(ApiError::Validation(vec![
            "quantity must be at least 1".to_owned(),
        ]));
    }
    Ok(())
}

/// `GET /api/cart`
pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>> {
    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    let items = repo.items(cart.id).await?;

    Ok(Json(CartResponse {
        id: cart.id,
        email: user.email,
        cart_items: items.into_iter().map(CartItemResponse::from).collect(),
    }))
}

/// `POST /api/cart/items`
pub async fn add_item(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    validate_quantity(request.quantity)?;

    // Soft-deleted books are not addable; they 404 like unknown ids.
    BookRepository::new(state.pool())
        .get_by_id(request.book_id)
        .await?
        .ok_or(ApiError::EntityNotFound {
            kind: "book",
            id: request.book_id.as_i64(),
        })?;

    let repo = CartRepository::new(state.pool());
    let cart = repo.get_or_create(user.id).await?;
    repo.add_item(cart.id, request.book_id, request.quantity)
        .await?;

    let items = repo.items(cart.id).await?;

    Ok(Json(CartResponse {
        id: cart.id,
        email: user.email,
        cart_items: items.into_iter().map(CartItemResponse::from).collect(),
    }))
}

/// `PUT /api/cart/items/{id}`
pub async fn update_item(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartItemResponse>> {
    validate_quantity(request.quantity)?;

    let repo = CartRepository::new(state.pool());
    let mut item = repo
        .get_item_for_user(id, user.id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "cart item", id: id.as_i64() })?;

    repo.set_item_quantity(id, request.quantity).await?;
    item.quantity = request.quantity;

    Ok(Json(CartItemResponse::from(item)))
}

/// `DELETE /api/cart/items/{id}`
pub async fn remove_item(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    let repo = CartRepository::new(state.pool());
    repo.get_item_for_user(id, user.id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "cart item", id: id.as_i64() })?;

    repo.delete_item(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
