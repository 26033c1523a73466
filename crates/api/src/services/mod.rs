//! Business logic services.
//!
//! Services own the flows that span more than one repository call or that
//! carry policy (password rules, token lifetimes, order arithmetic). They sit
//! between route handlers and the repositories in [`crate::db`].

pub mod auth;
pub mod orders;
