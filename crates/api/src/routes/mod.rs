//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (pings the database)
//!
//! # Auth
//! POST /api/auth/register          - Create an account
//! POST /api/auth/login             - Exchange credentials for a bearer token
//!
//! # Books
//! GET    /api/books                - List books (paged)
//! GET    /api/books/search         - Filtered search
//! GET    /api/books/{id}           - Book detail
//! POST   /api/books                - Create book (admin)
//! PUT    /api/books/{id}           - Replace book (admin)
//! DELETE /api/books/{id}           - Soft-delete book (admin)
//!
//! # Categories
//! GET    /api/categories           - List categories (paged)
//! GET    /api/categories/{id}      - Category detail
//! GET    /api/categories/{id}/books - Books in a category
//! POST   /api/categories           - Create category (admin)
//! PUT    /api/categories/{id}      - Replace category (admin)
//! DELETE /api/categories/{id}      - Soft-delete category (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                 - Current user's cart
//! POST   /api/cart/items           - Add a book (upserts the line)
//! PUT    /api/cart/items/{id}      - Set a line's quantity
//! DELETE /api/cart/items/{id}      - Remove a line
//!
//! # Orders (requires auth)
//! POST  /api/orders                - Convert the cart into an order
//! GET   /api/orders                - Current user's orders (paged)
//! GET   /api/orders/{id}           - Order detail with lines
//! GET   /api/orders/{id}/items     - Order lines
//! GET   /api/orders/{id}/items/{item_id} - Single order line
//! PATCH /api/orders/{id}           - Set order status (admin)
//! ```

pub mod auth;
pub mod books;
pub mod cart;
pub mod categories;
pub mod orders;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::state::AppState;

/// Largest page size a client may request.
const MAX_PAGE_SIZE: i64 = 100;

/// Zero-based page/size query parameters with defaults.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

impl Pagination {
    /// The `LIMIT` for this page, clamped to sane bounds.
    #[must_use]
    pub fn limit(self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }

    /// The `OFFSET` for this page.
    #[must_use]
    pub fn offset(self) -> i64 {
        self.page.max(0) * self.limit()
    }
}

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/books", book_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list).post(books::create))
        .route("/search", get(books::search))
        .route(
            "/{id}",
            get(books::get).put(books::update).delete(books::remove),
        )
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/{id}/books", get(categories::books))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::get))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::place))
        .route("/{id}", get(orders::get).patch(orders::update_status))
        .route("/{id}/items", get(orders::items))
        .route("/{id}/items/{item_id}", get(orders::get_item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_offset() {
        let p = Pagination { page: 3, size: 10 };
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 30);
    }

    #[test]
    fn test_pagination_clamps_abuse() {
        let p = Pagination { page: -1, size: 0 };
        assert_eq!(p.limit(), 1);
        assert_eq!(p.offset(), 0);

        let p = Pagination { page: 0, size: 10_000 };
        assert_eq!(p.limit(), MAX_PAGE_SIZE);
    }
}
