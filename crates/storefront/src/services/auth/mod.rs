//! Authentication service.
//!
//! Registration, password login, and the one-hour password reset flow.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;

use mobigear_core::Email;

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum username length.
const MIN_USERNAME_LENGTH: usize = 3;

/// Length of generated password reset tokens.
const RESET_TOKEN_LENGTH: usize = 48;

/// Authentication service.
///
/// Handles user registration, login, and password resets.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with the `user` role and log them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` /
    /// `AuthError::WeakPassword` / `AuthError::PasswordMismatch` on
    /// validation failures, and `AuthError::UserAlreadyExists` when the
    /// username or email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        phone: Option<&str>,
        password: &str,
        password_confirm: &str,
    ) -> Result<User, AuthError> {
        let username = username.trim();
        if username.len() < MIN_USERNAME_LENGTH {
            return Err(AuthError::InvalidUsername(format!(
                "Username must be at least {MIN_USERNAME_LENGTH} characters"
            )));
        }

        let email = Email::parse(email.trim())?;

        validate_password(password)?;
        if password != password_confirm {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = hash_password(password)?;
        let phone = phone.map(str::trim).filter(|p| !p.is_empty());

        let user = self
            .users
            .create(username, &email, phone, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username or email plus password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong username/password
    /// and `AuthError::AccountLocked` for locked accounts.
    pub async fn login(
        &self,
        username_or_email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password(username_or_email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if user.is_locked || !user.is_active {
            return Err(AuthError::AccountLocked);
        }

        Ok(user)
    }

    /// Start the password reset flow for an email or phone number.
    ///
    /// Returns the user and the generated token so the caller can email the
    /// reset link. Returns `Ok(None)` when no account matches.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn start_password_reset(
        &self,
        email_or_phone: &str,
    ) -> Result<Option<(User, String)>, AuthError> {
        let Some(user) = self.users.get_by_email_or_phone(email_or_phone.trim()).await? else {
            return Ok(None);
        };

        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        self.users.create_reset_token(user.id, &token).await?;

        Ok(Some((user, token)))
    }

    /// Look up an unused, unexpired reset token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenNotFound` for unknown or used tokens and
    /// `AuthError::TokenExpired` for expired ones.
    pub async fn check_reset_token(&self, token: &str) -> Result<(), AuthError> {
        let reset = self
            .users
            .get_unused_reset_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if reset.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }

    /// Complete the password reset flow.
    ///
    /// # Errors
    ///
    /// Returns the same token errors as [`Self::check_reset_token`], plus
    /// password validation errors.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<(), AuthError> {
        let reset = self
            .users
            .get_unused_reset_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        if reset.is_expired(Utc::now()) {
            return Err(AuthError::TokenExpired);
        }

        validate_password(password)?;
        if password != password_confirm {
            return Err(AuthError::PasswordMismatch);
        }

        let password_hash = hash_password(password)?;
        self.users.set_password(reset.user_id, &password_hash).await?;
        self.users.mark_reset_token_used(reset.id).await?;

        Ok(())
    }
}

/// Validate password strength.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` when the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AuthError::PasswordHash)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` when the password doesn't match.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("password123").expect("hashing succeeds");
        assert!(verify_password("password123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("password123").expect("hashing succeeds");
        let b = hash_password("password123").expect("hashing succeeds");
        assert_ne!(a, b);
    }
}
