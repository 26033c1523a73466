//! Core types for Paperback.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::{ParseRoleError, Role};
pub use status::{OrderStatus, ParseOrderStatusError};
