//! Category taxonomy entity.

use serde::Serialize;

use paperback_core::CategoryId;

/// A category row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}
