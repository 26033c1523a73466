//! Domain models and response shapes.
//!
//! Each entity module holds the row-mapped struct (`sqlx::FromRow`) plus the
//! JSON response shape the routes return. Request payloads live next to the
//! handlers that consume them.

pub mod book;
pub mod cart;
pub mod category;
pub mod order;
pub mod user;
