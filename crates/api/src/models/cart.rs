//! Shopping cart entities.

use serde::Serialize;

use paperback_core::{BookId, CartId, CartItemId, Email, UserId};

/// A user's cart. Created lazily on first access and kept for the lifetime of
/// the account; only its items come and go.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
}

/// One (book, quantity) line inside a cart, joined with the book title for
/// display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub book_id: BookId,
    pub book_title: String,
    pub quantity: i32,
}

/// JSON shape for cart responses.
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub id: CartId,
    pub email: Email,
    pub cart_items: Vec<CartItemResponse>,
}

/// JSON shape for a single cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub book_id: BookId,
    pub book_title: String,
    pub quantity: i32,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            book_id: item.book_id,
            book_title: item.book_title,
            quantity: item.quantity,
        }
    }
}
