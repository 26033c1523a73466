//! Unified error handling with Sentry integration.
//!
//! Provides a unified `ApiError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, ApiError>`. Error responses carry a JSON body with a timestamp
//! and a list of messages:
//!
//! ```json
//! { "timestamp": "2026-08-29T12:00:00Z", "errors": ["shopping cart is empty"] }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::PlaceOrderError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order placement failed.
    #[error("order error: {0}")]
    Order(#[from] PlaceOrderError),

    /// A named entity does not exist (or is soft-deleted).
    #[error("{kind} with id {id} not found")]
    EntityNotFound {
        kind: &'static str,
        id: i64,
    },

    /// Request body failed validation; each message names one problem.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// State conflict, e.g. a duplicate unique field.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed.
    #[error("forbidden")]
    Forbidden,
}

/// The JSON error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub errors: Vec<String>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::PasswordMismatch => StatusCode::BAD_REQUEST,
                AuthError::TokenCreation
                | AuthError::Repository(_)
                | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            // An empty cart is a client mistake, not a missing resource.
            Self::Order(err) => match err {
                PlaceOrderError::EmptyCart => StatusCode::BAD_REQUEST,
                PlaceOrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::EntityNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::Database(RepositoryError::Conflict(msg)) | Self::Conflict(msg) => {
                vec![msg.clone()]
            }
            Self::Database(RepositoryError::NotFound) => vec!["not found".to_owned()],
            Self::Auth(err) => vec![match err {
                AuthError::InvalidCredentials => "invalid credentials".to_owned(),
                AuthError::InvalidToken => "invalid or expired token".to_owned(),
                AuthError::UserAlreadyExists => {
                    "an account with this email already exists".to_owned()
                }
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::PasswordMismatch => "the password fields must match".to_owned(),
                _ => "internal server error".to_owned(),
            }],
            Self::Order(PlaceOrderError::EmptyCart) => vec!["shopping cart is empty".to_owned()],
            Self::EntityNotFound { .. } => vec![self.to_string()],
            Self::Unauthorized => vec!["authentication required".to_owned()],
            Self::Forbidden => vec!["insufficient privileges".to_owned()],
            // Never leak database or hashing details to clients.
            Self::Database(_) | Self::Order(PlaceOrderError::Repository(_)) => {
                vec!["internal server error".to_owned()]
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            timestamp: Utc::now(),
            errors: self.messages(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
