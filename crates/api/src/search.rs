//! Dynamic book search predicates.
//!
//! Optional query parameters become a list of [`Filter`]s which are ANDed
//! onto the base catalog query. Absent or blank parameters contribute no
//! constraint at all, so an empty search is equivalent to listing every
//! active book.

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

/// Optional search fields accepted by `GET /api/books/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookSearchParams {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
}

/// How a filter value is matched against its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Case-insensitive substring match.
    Contains,
    /// Case-insensitive exact match (compared uppercased).
    EqualsIgnoreCase,
}

/// A single column constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub matcher: Matcher,
    pub value: String,
}

impl BookSearchParams {
    /// Build the filter list in a fixed column order.
    ///
    /// ISBN is the only exact-match field; title, author and description are
    /// substring matches.
    #[must_use]
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();

        push_filter(&mut filters, "title", Matcher::Contains, &self.title);
        push_filter(&mut filters, "author", Matcher::Contains, &self.author);
        push_filter(&mut filters, "isbn", Matcher::EqualsIgnoreCase, &self.isbn);
        push_filter(
            &mut filters,
            "description",
            Matcher::Contains,
            &self.description,
        );

        filters
    }

    /// Whether every field is absent or blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters().is_empty()
    }
}

fn push_filter(
    filters: &mut Vec<Filter>,
    column: &'static str,
    matcher: Matcher,
    value: &Option<String>,
) {
    if let Some(value) = value
        && !value.trim().is_empty()
    {
        filters.push(Filter {
            column,
            matcher,
            value: value.clone(),
        });
    }
}

/// AND each filter onto a query that already has a WHERE clause.
///
/// Values are always bound parameters; only the static column names are
/// spliced into the SQL text.
pub fn apply_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: Vec<Filter>) {
    for filter in filters {
        builder.push(" AND ");
        match filter.matcher {
            Matcher::Contains => {
                builder.push(filter.column);
                builder.push(" ILIKE ");
                builder.push_bind(format!("%{}%", escape_like(&filter.value)));
            }
            Matcher::EqualsIgnoreCase => {
                builder.push("UPPER(");
                builder.push(filter.column);
                builder.push(") = ");
                builder.push_bind(filter.value.to_uppercase());
            }
        }
    }
}

/// Escape LIKE wildcards in user input so they match literally.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        title: Option<&str>,
        author: Option<&str>,
        isbn: Option<&str>,
        description: Option<&str>,
    ) -> BookSearchParams {
        BookSearchParams {
            title: title.map(str::to_owned),
            author: author.map(str::to_owned),
            isbn: isbn.map(str::to_owned),
            description: description.map(str::to_owned),
        }
    }

    #[test]
    fn test_all_fields_absent_yields_no_filters() {
        assert!(params(None, None, None, None).filters().is_empty());
    }

    #[test]
    fn test_blank_fields_are_skipped() {
        let p = params(Some(""), Some("   "), Some("\t"), None);
        assert!(p.filters().is_empty());
        assert!(p.is_empty());
    }

    #[test]
    fn test_fixed_field_order() {
        let p = params(Some("dune"), Some("herbert"), Some("0441013597"), Some("spice"));
        let columns: Vec<_> = p.filters().into_iter().map(|f| f.column).collect();
        assert_eq!(columns, vec!["title", "author", "isbn", "description"]);
    }

    #[test]
    fn test_isbn_is_exact_match_others_contains() {
        let p = params(Some("dune"), None, Some("0441013597"), None);
        let filters = p.filters();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].matcher, Matcher::Contains);
        assert_eq!(filters[1].matcher, Matcher::EqualsIgnoreCase);
    }

    #[test]
    fn test_apply_filters_builds_and_clauses() {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT * FROM books WHERE is_deleted = FALSE");
        let p = params(Some("dune"), None, Some("0441013597"), None);
        apply_filters(&mut builder, p.filters());

        let sql = builder.sql();
        assert_eq!(
            sql,
            "SELECT * FROM books WHERE is_deleted = FALSE \
             AND title ILIKE $1 AND UPPER(isbn) = $2"
        );
    }

    #[test]
    fn test_apply_filters_empty_leaves_base_query() {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT * FROM books WHERE is_deleted = FALSE");
        apply_filters(&mut builder, Vec::new());
        assert_eq!(builder.sql(), "SELECT * FROM books WHERE is_deleted = FALSE");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
