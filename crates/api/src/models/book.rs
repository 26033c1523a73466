//! Book catalog entity.

use rust_decimal::Decimal;
use serde::Serialize;

use paperback_core::{BookId, CategoryId};

/// A book row from the catalog.
///
/// `price` is the live catalog price; order lines copy it at placement time
/// and never read it again.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

/// JSON shape for book responses.
#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub category_ids: Vec<CategoryId>,
}

impl BookResponse {
    /// Combine a book row with its category links.
    #[must_use]
    pub fn from_book(book: Book, category_ids: Vec<CategoryId>) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            price: book.price,
            description: book.description,
            cover_image: book.cover_image,
            category_ids,
        }
    }
}

/// Structural ISBN validation (ISBN-10 or ISBN-13).
///
/// Hyphens and spaces are ignored; an ISBN-10 may end in `X`. Checksum digits
/// are not verified.
#[must_use]
pub fn is_valid_isbn(raw: &str) -> bool {
    let cleaned: Vec<char> = raw
        .chars()
        .filter(|c| *c != '-' && *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    match cleaned.len() {
        10 => {
            let (digits, last) = cleaned.split_at(9);
            digits.iter().all(char::is_ascii_digit)
                && last.first().is_some_and(|c| c.is_ascii_digit() || *c == 'X')
        }
        13 => cleaned.iter().all(char::is_ascii_digit),
        _ => false,
    }
}
