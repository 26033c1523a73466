//! Registration and login handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::models::user::UserResponse;
use crate::services::auth::Registration;
use crate::state::AppState;

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub repeat_password: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: Option<String>,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let mut problems = Vec::new();
    if request.first_name.trim().is_empty() {
        problems.push("first_name must not be blank".to_owned());
    }
    if request.last_name.trim().is_empty() {
        problems.push("last_name must not be blank".to_owned());
    }
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    let user = state
        .auth()
        .register(Registration {
            email: &request.email,
            password: &request.password,
            repeat_password: &request.repeat_password,
            first_name: request.first_name.trim(),
            last_name: request.last_name.trim(),
            shipping_address: request.shipping_address.as_deref(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (user, token) = state.auth().login(&request.email, &request.password).await?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}
