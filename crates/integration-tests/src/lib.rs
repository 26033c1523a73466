//! Integration test support for Paperback.
//!
//! Builds the full API router over a lazily-connecting pool so the HTTP
//! surface (routing, extractors, validation, error bodies) can be exercised
//! without a running database. Anything that would actually touch storage
//! needs `PAPERBACK_DATABASE_URL` pointing at a test database.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use axum::Router;
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;

use paperback_api::config::ApiConfig;
use paperback_api::state::AppState;

/// Build the application router with test configuration.
///
/// The pool connects lazily; handlers that never reach the database work
/// without one.
///
/// # Panics
///
/// Panics if the pool options are invalid.
#[must_use]
pub fn test_app() -> Router {
    let config = ApiConfig {
        database_url: SecretString::from("postgres://localhost/paperback_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        jwt_secret: SecretString::from("xK3mQ9vR2tZ8wB5nD7fG1hJ4sL6pY0aE"),
        token_ttl: Duration::from_secs(3600),
        sentry_dsn: None,
    };

    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/paperback_test")
        .expect("lazy pool options are valid");

    paperback_api::app(AppState::new(config, pool))
}
