//! User repository.

use sqlx::{PgPool, Row};

use paperback_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::user::User;

/// Fields accepted when registering a user. The credential arrives already
/// hashed; this layer never sees plaintext passwords.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: Option<String>,
}

/// Repository for user account operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an active user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, email, first_name, last_name, shipping_address, role \
             FROM users WHERE email = $1 AND is_deleted = FALSE",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    /// Get an active user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, email, first_name, last_name, shipping_address, role \
             FROM users WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| user_from_row(&r)).transpose()
    }

    /// Register a new user with the default role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO users (email, password_hash, first_name, last_name, \
                                shipping_address, role) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, email, first_name, last_name, shipping_address, role",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.shipping_address)
        .bind(Role::User)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        user_from_row(&row)
    }

    /// Get an active user together with their credential hash.
    ///
    /// Returns `None` if no active user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, email, first_name, last_name, shipping_address, role, password_hash \
             FROM users WHERE email = $1 AND is_deleted = FALSE",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash: String = row.try_get("password_hash")?;
        let user = user_from_row(&row)?;

        Ok(Some((user, password_hash)))
    }
}

/// Map a user row, validating stored values.
fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, RepositoryError> {
    let email: String = row.try_get("email")?;
    let email = Email::parse(&email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    let role: String = row.try_get("role")?;
    let role: Role = role
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

    Ok(User {
        id: row.try_get("id")?,
        email,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        shipping_address: row.try_get("shipping_address")?,
        role,
    })
}
