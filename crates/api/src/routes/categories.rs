//! Category taxonomy handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use paperback_core::CategoryId;

use super::Pagination;
use super::books::{not_found_as_entity, with_categories};
use crate::db::books::BookRepository;
use crate::db::categories::{CategoryRepository, NewCategory};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::book::BookResponse;
use crate::models::category::Category;
use crate::state::AppState;

/// Request body for creating or replacing a category.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryRequest {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation(vec![
                "name must not be blank".to_owned(),
            ]));
        }
        Ok(())
    }
}

/// `GET /api/categories`
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool())
        .list(pagination.limit(), pagination.offset())
        .await?;

    Ok(Json(categories))
}

/// `GET /api/categories/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    let category = CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "category", id: id.as_i64() })?;

    Ok(Json(category))
}

/// `GET /api/categories/{id}/books`
pub async fn books(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<BookResponse>>> {
    // 404 for an unknown category rather than an empty list
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "category", id: id.as_i64() })?;

    let repo = BookRepository::new(state.pool());
    let books = repo.list_by_category(id).await?;

    Ok(Json(with_categories(&repo, books).await?))
}

/// `POST /api/categories` (admin)
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    request.validate()?;

    let category = CategoryRepository::new(state.pool())
        .create(&NewCategory {
            name: request.name.trim().to_owned(),
            description: request.description,
        })
        .await?;

    tracing::info!(category_id = %category.id, "category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /api/categories/{id}` (admin)
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<Category>> {
    request.validate()?;

    let category = CategoryRepository::new(state.pool())
        .update(
            id,
            &NewCategory {
                name: request.name.trim().to_owned(),
                description: request.description,
            },
        )
        .await
        .map_err(|e| not_found_as_entity(e, "category", id.as_i64()))?;

    Ok(Json(category))
}

/// `DELETE /api/categories/{id}` (admin)
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool())
        .soft_delete(id)
        .await
        .map_err(|e| not_found_as_entity(e, "category", id.as_i64()))?;

    tracing::info!(category_id = %id, "category soft-deleted");

    Ok(StatusCode::NO_CONTENT)
}
