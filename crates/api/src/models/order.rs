//! Order entities.
//!
//! Orders are immutable after creation except for their status. Every order
//! line carries a price snapshot taken when the order was placed; catalog
//! price changes never reach back into order history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use paperback_core::{BookId, OrderId, OrderItemId, OrderStatus, UserId};

/// An order row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub order_date: DateTime<Utc>,
    pub shipping_address: String,
}

/// One line of an order, joined with the book title for display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub book_id: BookId,
    pub book_title: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// JSON shape for order responses.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub order_date: DateTime<Utc>,
    pub shipping_address: String,
    pub order_items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    /// Combine an order row with its lines.
    #[must_use]
    pub fn from_order(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            status: order.status,
            total: order.total,
            order_date: order.order_date,
            shipping_address: order.shipping_address,
            order_items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

/// JSON shape for a single order line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemResponse {
    pub id: OrderItemId,
    pub book_id: BookId,
    pub book_title: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            book_id: item.book_id,
            book_title: item.book_title,
            quantity: item.quantity,
            price: item.price,
        }
    }
}
