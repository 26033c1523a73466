//! Wire-format contract for order statuses.
//!
//! `PATCH /api/orders/{id}` bodies and order responses both carry the status
//! as a SCREAMING_SNAKE_CASE string; this pins the full set of accepted
//! values.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use paperback_core::OrderStatus;

#[test]
fn every_status_serializes_to_its_wire_string() {
    for status in OrderStatus::ALL {
        let value = serde_json::to_value(status).unwrap();
        assert_eq!(value, json!(status.as_str()));
    }
}

#[test]
fn patch_body_shape_deserializes() {
    #[derive(serde::Deserialize)]
    struct Body {
        status: OrderStatus,
    }

    let body: Body = serde_json::from_value(json!({ "status": "DELIVERED" })).unwrap();
    assert_eq!(body.status, OrderStatus::Delivered);

    assert!(serde_json::from_value::<Body>(json!({ "status": "REFUNDED" })).is_err());
}
