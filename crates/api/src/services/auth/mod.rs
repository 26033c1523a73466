//! Authentication service.
//!
//! Password registration and login backed by argon2 hashing, with HS256
//! bearer tokens for request authentication. Token claims carry only the
//! user's email; the role is re-read from the database on every request so
//! privilege changes take effect immediately.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::time::Duration;

use paperback_core::Email;

use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::user::User;

/// Password length bounds.
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 32;

/// JWT claims for issued bearer tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's email address.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Input for registering a new account.
#[derive(Debug)]
pub struct Registration<'r> {
    pub email: &'r str,
    pub password: &'r str,
    pub repeat_password: &'r str,
    pub first_name: &'r str,
    pub last_name: &'r str,
    pub shipping_address: Option<&'r str>,
}

/// Authentication service.
///
/// Handles user registration, login, and bearer token issuance/verification.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    jwt_secret: &'a SecretString,
    token_ttl: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, jwt_secret: &'a SecretString, token_ttl: Duration) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt_secret,
            token_ttl,
        }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` or `AuthError::PasswordMismatch` if
    /// the password fails validation.
    /// Returns `AuthError::UserAlreadyExists` if the email is registered.
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;

        validate_password(registration.password)?;
        if registration.password != registration.repeat_password {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash,
                first_name: registration.first_name.to_owned(),
                last_name: registration.last_name.to_owned(),
                shipping_address: registration.shipping_address.map(str::to_owned),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, returning the user and a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let token = self.issue_token(&user.email)?;

        Ok((user, token))
    }

    /// Issue a signed bearer token for an email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn issue_token(&self, email: &Email) -> Result<String, AuthError> {
        sign_token(self.jwt_secret, self.token_ttl, email)
    }

    /// Verify a bearer token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed, expired,
    /// or signed with a different key.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode_token(self.jwt_secret, token)
    }

    /// Resolve the user a verified token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the account no longer exists.
    pub async fn user_for_claims(&self, claims: &Claims) -> Result<User, AuthError> {
        let email = Email::parse(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        self.users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

/// Sign claims for an email into a bearer token.
///
/// Pure over the secret and TTL so it needs no connection state.
fn sign_token(
    secret: &SecretString,
    token_ttl: Duration,
    email: &Email,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    #[allow(clippy::cast_possible_wrap)] // TTLs are far below i64::MAX seconds
    let claims = Claims {
        sub: email.as_str().to_owned(),
        iat: now,
        exp: now + token_ttl.as_secs() as i64,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenCreation)
}

/// Decode and validate a bearer token against the signing secret.
fn decode_token(secret: &SecretString, token: &str) -> Result<Claims, AuthError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Validate password length bounds.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_bounds() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            validate_password(&"x".repeat(33)),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password(&"x".repeat(32)).is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("battery staple", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("correct horse").unwrap();
        let b = hash_password("correct horse").unwrap();
        assert_ne!(a, b);
    }

    // Token signing is pure over the secret and TTL, so these tests need no
    // pool or runtime.

    #[test]
    fn test_token_roundtrip() {
        let secret = SecretString::from("0aW9xKq2mZr7TbVf4sHj8uLc3pNdYe6g");

        let email = Email::parse("reader@example.com").unwrap();
        let token = sign_token(&secret, Duration::from_secs(60), &email).unwrap();
        let claims = decode_token(&secret, &token).unwrap();
        assert_eq!(claims.sub, "reader@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejects_wrong_key() {
        let secret = SecretString::from("0aW9xKq2mZr7TbVf4sHj8uLc3pNdYe6g");
        let other = SecretString::from("Zq1vB8nM5kC2xD7fG4hJ0sL9wE6rT3yU");

        let email = Email::parse("reader@example.com").unwrap();
        let token = sign_token(&secret, Duration::from_secs(60), &email).unwrap();
        assert!(matches!(
            decode_token(&other, &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let secret = SecretString::from("0aW9xKq2mZr7TbVf4sHj8uLc3pNdYe6g");

        assert!(matches!(
            decode_token(&secret, "not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
