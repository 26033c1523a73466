//! Book catalog handlers.
//!
//! Reads are public; mutations require an admin token. Responses carry the
//! book's category links alongside its own fields.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use paperback_core::{BookId, CategoryId};

use super::Pagination;
use crate::db::books::{BookRepository, NewBook};
use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::models::book::{Book, BookResponse, is_valid_isbn};
use crate::search::BookSearchParams;
use crate::state::AppState;

/// Request body for creating or replacing a book.
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl BookRequest {
    /// Validate the request, collecting every problem.
    fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push("title must not be blank".to_owned());
        }
        if self.author.trim().is_empty() {
            problems.push("author must not be blank".to_owned());
        }
        if !is_valid_isbn(&self.isbn) {
            problems.push("isbn must be a valid ISBN-10 or ISBN-13".to_owned());
        }
        if self.price <= Decimal::ZERO {
            problems.push("price must be positive".to_owned());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(problems))
        }
    }

    fn into_new_book(self) -> NewBook {
        NewBook {
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            price: self.price,
            description: self.description,
            cover_image: self.cover_image,
            category_ids: self.category_ids,
        }
    }
}

/// `GET /api/books`
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<BookResponse>>> {
    let repo = BookRepository::new(state.pool());
    let books = repo.list(pagination.limit(), pagination.offset()).await?;

    Ok(Json(with_categories(&repo, books).await?))
}

/// `GET /api/books/search`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<BookSearchParams>,
) -> Result<Json<Vec<BookResponse>>> {
    let repo = BookRepository::new(state.pool());
    let books = repo.search(&params).await?;

    Ok(Json(with_categories(&repo, books).await?))
}

/// `GET /api/books/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<BookResponse>> {
    let repo = BookRepository::new(state.pool());
    let book = repo
        .get_by_id(id)
        .await?
        .ok_or(ApiError::EntityNotFound { kind: "book", id: id.as_i64() })?;

    let mut categories = repo.category_ids_for(&[book.id]).await?;
    let category_ids = categories.remove(&book.id).unwrap_or_default();

    Ok(Json(BookResponse::from_book(book, category_ids)))
}

/// `POST /api/books` (admin)
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>)> {
    request.validate()?;

    let new_book = request.into_new_book();
    let category_ids = new_book.category_ids.clone();
    let book = BookRepository::new(state.pool()).create(&new_book).await?;

    tracing::info!(book_id = %book.id, "book created");

    Ok((
        StatusCode::CREATED,
        Json(BookResponse::from_book(book, category_ids)),
    ))
}

/// `PUT /api/books/{id}` (admin)
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(request): Json<BookRequest>,
) -> Result<Json<BookResponse>> {
    request.validate()?;

    let new_book = request.into_new_book();
    let category_ids = new_book.category_ids.clone();
    let book = BookRepository::new(state.pool())
        .update(id, &new_book)
        .await
        .map_err(|e| not_found_as_entity(e, "book", id.as_i64()))?;

    Ok(Json(BookResponse::from_book(book, category_ids)))
}

/// `DELETE /api/books/{id}` (admin)
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<StatusCode> {
    BookRepository::new(state.pool())
        .soft_delete(id)
        .await
        .map_err(|e| not_found_as_entity(e, "book", id.as_i64()))?;

    tracing::info!(book_id = %id, "book soft-deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Attach category links to a page of books.
pub(super) async fn with_categories(
    repo: &BookRepository<'_>,
    books: Vec<Book>,
) -> Result<Vec<BookResponse>> {
    let ids: Vec<BookId> = books.iter().map(|b| b.id).collect();
    let mut categories = repo.category_ids_for(&ids).await?;

    Ok(books
        .into_iter()
        .map(|book| {
            let category_ids = categories.remove(&book.id).unwrap_or_default();
            BookResponse::from_book(book, category_ids)
        })
        .collect())
}

/// Turn a repository `NotFound` into a named entity error.
pub(super) fn not_found_as_entity(
    err: crate::db::RepositoryError,
    kind: &'static str,
    id: i64,
) -> ApiError {
    match err {
        crate::db::RepositoryError::NotFound => ApiError::EntityNotFound { kind, id },
        other => ApiError::Database(other),
    }
}
