//! User repository.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mobigear_core::{Email, ResetTokenId, RoleName, UserId};

use super::RepositoryError;
use crate::models::user::{PasswordResetToken, User};

/// How long a password reset token stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

const USER_COLUMNS: &str = r"
    u.id, u.username, u.email, u.first_name, u.last_name, u.phone, u.avatar_url,
    r.name AS role, u.address, u.latitude, u.longitude, u.theme_brightness,
    u.is_active, u.is_locked, u.created_at, u.updated_at
";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    avatar_url: Option<String>,
    role: Option<RoleName>,
    address: Option<String>,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    theme_brightness: i32,
    is_active: bool,
    is_locked: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username: row.username,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            avatar_url: row.avatar_url,
            role: row.role,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            theme_brightness: row.theme_brightness,
            is_active: row.is_active,
            is_locked: row.is_locked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResetTokenRow {
    id: i32,
    user_id: i32,
    token: String,
    is_used: bool,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ResetTokenRow> for PasswordResetToken {
    fn from(row: ResetTokenRow) -> Self {
        Self {
            id: ResetTokenId::new(row.id),
            user_id: UserId::new(row.user_id),
            token: row.token,
            is_used: row.is_used,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Fields a user can change on the profile page.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub theme_brightness: i32,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u LEFT JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Find a user by username or email, for login.
    ///
    /// Returns the user together with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        username_or_email: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, u.password_hash
             FROM users u LEFT JOIN roles r ON r.id = u.role_id
             WHERE u.username = $1 OR u.email = $1"
        );

        #[derive(sqlx::FromRow)]
        struct WithPassword {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, WithPassword>(&sql)
            .bind(username_or_email)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some((r.user.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Find a user by email or phone (password reset lookup).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email_or_phone(
        &self,
        needle: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u LEFT JOIN roles r ON r.id = u.role_id
             WHERE u.email = $1 OR u.phone = $1
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(needle)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a new user with the `user` role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        phone: Option<&str>,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO users (username, email, phone, password_hash, role_id)
                VALUES ($1, $2, $3, $4, (SELECT id FROM roles WHERE name = 'user'))
                RETURNING *
             )
             SELECT {USER_COLUMNS} FROM inserted u LEFT JOIN roles r ON r.id = u.role_id"
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .bind(email.as_str())
            .bind(phone)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "username or email already exists"))?;

        row.try_into()
    }

    /// Update the profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET first_name = $1, last_name = $2, email = $3, phone = $4,
                address = $5, latitude = $6, longitude = $7,
                theme_brightness = $8, updated_at = NOW()
            WHERE id = $9
            ",
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(update.email.as_str())
        .bind(update.phone.as_deref())
        .bind(update.address.as_deref())
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(update.theme_brightness)
        .bind(id.as_i32())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update the delivery coordinates (and optionally the address).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_location(
        &self,
        id: UserId,
        latitude: Decimal,
        longitude: Decimal,
        address: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET latitude = $1, longitude = $2,
                address = COALESCE($3, address),
                updated_at = NOW()
            WHERE id = $4
            ",
        )
        .bind(latitude)
        .bind(longitude)
        .bind(address)
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update the theme brightness preference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_brightness(
        &self,
        id: UserId,
        brightness: i32,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET theme_brightness = $1, updated_at = NOW() WHERE id = $2")
                .bind(brightness)
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
                .bind(password_hash)
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Create a one-hour password reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_reset_token(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<PasswordResetToken, RepositoryError> {
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r"
            INSERT INTO password_reset_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token, is_used, expires_at, created_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(token)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Fetch an unused reset token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_unused_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, RepositoryError> {
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r"
            SELECT id, user_id, token, is_used, expires_at, created_at
            FROM password_reset_tokens
            WHERE token = $1 AND is_used = FALSE
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Mark a reset token as used.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token doesn't exist.
    pub async fn mark_reset_token_used(&self, id: ResetTokenId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE password_reset_tokens SET is_used = TRUE WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
