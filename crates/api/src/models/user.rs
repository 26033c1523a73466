//! User account entity.

use serde::Serialize;

use paperback_core::{Email, Role, UserId};

/// A user account.
///
/// `shipping_address` is copied onto orders at placement time so later edits
/// to the profile never rewrite order history.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: Option<String>,
    pub role: Role,
}

/// JSON shape for user responses (never exposes the credential hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub shipping_address: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            shipping_address: user.shipping_address,
        }
    }
}
