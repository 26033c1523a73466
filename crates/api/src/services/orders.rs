//! Order conversion logic.
//!
//! Converting a cart into an order is the one multi-entity state transition
//! in the system. The arithmetic and draft-building here are pure so they can
//! be tested without a database; the transactional flow that applies them
//! lives in [`crate::db::orders::OrderRepository::place_order`].

use rust_decimal::Decimal;
use thiserror::Error;

use paperback_core::BookId;

use crate::db::RepositoryError;

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The user's cart is absent or has no lines. Nothing was created.
    #[error("shopping cart is empty")]
    EmptyCart,

    /// Storage failure; the transaction was rolled back.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// An order line before it is persisted.
///
/// `price` is the book's catalog price captured at conversion time. It is
/// written to the order line verbatim and never re-read, so later catalog
/// price changes cannot alter this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineDraft {
    pub book_id: BookId,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderLineDraft {
    /// The line subtotal: snapshot price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Sum line subtotals into the order total.
///
/// Accumulated left to right over the lines in their insertion order, using
/// exact decimal arithmetic.
#[must_use]
pub fn order_total(lines: &[OrderLineDraft]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |total, line| total + line.subtotal())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(book_id: i64, quantity: i32, price: &str) -> OrderLineDraft {
        OrderLineDraft {
            book_id: BookId::new(book_id),
            quantity,
            price: price.parse().unwrap(),
        }
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(draft(1, 2, "10.00").subtotal(), "20.00".parse().unwrap());
        assert_eq!(draft(2, 3, "12.50").subtotal(), "37.50".parse().unwrap());
    }

    #[test]
    fn test_order_total_two_lines() {
        // Cart [(A, qty 2, 10.00), (B, qty 1, 5.00)] totals 25.00.
        let lines = vec![draft(1, 2, "10.00"), draft(2, 1, "5.00")];
        assert_eq!(order_total(&lines), "25.00".parse().unwrap());
    }

    #[test]
    fn test_order_total_single_line() {
        let lines = vec![draft(7, 3, "12.50")];
        assert_eq!(order_total(&lines), "37.50".parse().unwrap());
    }

    #[test]
    fn test_order_total_empty() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_order_total_exact_decimal_no_drift() {
        // 0.10 summed ten times must be exactly 1.00, not 0.9999...
        let lines: Vec<_> = (0..10).map(|i| draft(i, 1, "0.10")).collect();
        assert_eq!(order_total(&lines), "1.00".parse().unwrap());
    }

    #[test]
    fn test_order_total_is_order_insensitive() {
        let a = vec![draft(1, 2, "10.00"), draft(2, 1, "5.00"), draft(3, 4, "0.99")];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(order_total(&a), order_total(&b));
    }
}
