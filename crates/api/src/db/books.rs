//! Book repository.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgPool, QueryBuilder, Row};

use paperback_core::{BookId, CategoryId};

use super::RepositoryError;
use crate::models::book::Book;
use crate::search::{self, BookSearchParams};

const BOOK_COLUMNS: &str = "id, title, author, isbn, price, description, cover_image";

/// Fields accepted when creating or replacing a book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category_ids: Vec<CategoryId>,
}

/// Repository for book catalog operations.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active books, paged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Book>, RepositoryError> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE is_deleted = FALSE ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(books)
    }

    /// Get an active book by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 AND is_deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(book)
    }

    /// Search active books with the dynamic predicate builder.
    ///
    /// Blank or absent parameters contribute no constraint; an empty search
    /// returns every active book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, params: &BookSearchParams) -> Result<Vec<Book>, RepositoryError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE is_deleted = FALSE"
        ));
        search::apply_filters(&mut builder, params.filters());
        builder.push(" ORDER BY id");

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(self.pool)
            .await?;

        Ok(books)
    }

    /// List active books linked to a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Book>, RepositoryError> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT b.{} FROM books b \
             JOIN books_categories bc ON bc.book_id = b.id \
             WHERE bc.category_id = $1 AND b.is_deleted = FALSE \
             ORDER BY b.id",
            BOOK_COLUMNS.replace(", ", ", b.")
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(books)
    }

    /// Create a book with its category links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the ISBN already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_book: &NewBook) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, author, isbn, price, description, cover_image) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&new_book.title)
        .bind(&new_book.author)
        .bind(&new_book.isbn)
        .bind(new_book.price)
        .bind(&new_book.description)
        .bind(&new_book.cover_image)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "isbn already exists"))?;

        link_categories(&mut tx, book.id, &new_book.category_ids).await?;

        tx.commit().await?;

        Ok(book)
    }

    /// Replace a book's fields and category links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no active book has this id.
    /// Returns `RepositoryError::Conflict` if the new ISBN already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: BookId, new_book: &NewBook) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books \
             SET title = $1, author = $2, isbn = $3, price = $4, \
                 description = $5, cover_image = $6 \
             WHERE id = $7 AND is_deleted = FALSE \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&new_book.title)
        .bind(&new_book.author)
        .bind(&new_book.isbn)
        .bind(new_book.price)
        .bind(&new_book.description)
        .bind(&new_book.cover_image)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "isbn already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query("DELETE FROM books_categories WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_categories(&mut tx, id, &new_book.category_ids).await?;

        tx.commit().await?;

        Ok(book)
    }

    /// Soft-delete a book. Historical order items keep referencing the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no active book has this id.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn soft_delete(&self, id: BookId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE books SET is_deleted = TRUE WHERE id = $1 AND is_deleted = FALSE")
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Fetch category links for a set of books.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_ids_for(
        &self,
        book_ids: &[BookId],
    ) -> Result<HashMap<BookId, Vec<CategoryId>>, RepositoryError> {
        if book_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<i64> = book_ids.iter().map(|id| id.as_i64()).collect();
        let rows = sqlx::query(
            "SELECT book_id, category_id FROM books_categories \
             WHERE book_id = ANY($1) ORDER BY category_id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut map: HashMap<BookId, Vec<CategoryId>> = HashMap::new();
        for row in rows {
            let book_id: BookId = row.try_get("book_id")?;
            let category_id: CategoryId = row.try_get("category_id")?;
            map.entry(book_id).or_default().push(category_id);
        }

        Ok(map)
    }
}

/// Insert category links for a book inside an open transaction.
async fn link_categories(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    book_id: BookId,
    category_ids: &[CategoryId],
) -> Result<(), RepositoryError> {
    for category_id in category_ids {
        sqlx::query(
            "INSERT INTO books_categories (book_id, category_id) \
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
