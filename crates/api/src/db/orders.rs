//! Order repository.

use chrono::Utc;
use sqlx::{PgPool, Row};

use paperback_core::{CartId, OrderId, OrderItemId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem};
use crate::models::user::User;
use crate::services::orders::{self, OrderLineDraft, PlaceOrderError};

const ORDER_COLUMNS: &str = "id, user_id, status, total, order_date, shipping_address";
const ITEM_COLUMNS: &str = "oi.id, oi.order_id, oi.book_id, b.title AS book_title, \
                            oi.quantity, oi.price";

/// Repository for order persistence and ownership-scoped lookup.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert the user's cart into a persisted order.
    ///
    /// The whole conversion runs in one transaction: the cart row is locked
    /// with `FOR UPDATE` so concurrent calls for the same user serialize; the
    /// loser of the race then sees an empty cart and gets `EmptyCart`. Line
    /// prices are snapshotted from the catalog inside the same transaction,
    /// the total is summed over the drafts, and the cart lines are removed.
    /// Any failure rolls the transaction back, leaving the cart untouched.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::EmptyCart` if the cart is absent or empty.
    /// Returns `PlaceOrderError::Repository` if storage fails; no partial
    /// order is visible in that case.
    pub async fn place_order(
        &self,
        user: &User,
    ) -> Result<(Order, Vec<OrderItem>), PlaceOrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        // Serialize conversions per user on the cart row.
        let cart_id: Option<CartId> =
            sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1 FOR UPDATE")
                .bind(user.id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(RepositoryError::from)?;

        let Some(cart_id) = cart_id else {
            return Err(PlaceOrderError::EmptyCart);
        };

        // Snapshot each line's current catalog price.
        let rows = sqlx::query(
            "SELECT ci.book_id, ci.quantity, b.price \
             FROM cart_items ci JOIN books b ON b.id = ci.book_id \
             WHERE ci.cart_id = $1 ORDER BY ci.id",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        if rows.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }

        let mut drafts = Vec::with_capacity(rows.len());
        for row in &rows {
            drafts.push(OrderLineDraft {
                book_id: row.try_get("book_id").map_err(RepositoryError::from)?,
                quantity: row.try_get("quantity").map_err(RepositoryError::from)?,
                price: row.try_get("price").map_err(RepositoryError::from)?,
            });
        }

        let total = orders::order_total(&drafts);
        let shipping_address = user.shipping_address.clone().unwrap_or_default();

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, status, total, order_date, shipping_address) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(OrderStatus::Created)
        .bind(total)
        .bind(Utc::now())
        .bind(&shipping_address)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        for draft in &drafts {
            sqlx::query(
                "INSERT INTO order_items (order_id, book_id, quantity, price) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id)
            .bind(draft.book_id)
            .bind(draft.quantity)
            .bind(draft.price)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;
        }

        // Empty the cart; the cart row itself persists.
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;

        let items = self.items(order.id).await?;

        Ok((order, items))
    }

    /// List a user's orders, paged, newest last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND is_deleted = FALSE \
             ORDER BY id LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Get an order scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// List an order's lines in insertion order.
    ///
    /// Joins through to books without the soft-delete filter: lines must stay
    /// readable even after their book is tombstoned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items oi \
             JOIN books b ON b.id = oi.book_id \
             WHERE oi.order_id = $1 AND oi.is_deleted = FALSE \
             ORDER BY oi.id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Get a single order line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(
        &self,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> Result<Option<OrderItem>, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items oi \
             JOIN books b ON b.id = oi.book_id \
             WHERE oi.id = $1 AND oi.order_id = $2 AND oi.is_deleted = FALSE"
        ))
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// Set an order's status.
    ///
    /// Deliberately permissive: any known status may replace any other, and
    /// ownership is not checked here; the caller's privilege is enforced at
    /// the route boundary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no active order has this id.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $1 \
             WHERE id = $2 AND is_deleted = FALSE \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(status)
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(order)
    }
}
