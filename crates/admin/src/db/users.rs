//! User management repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use mobigear_core::{RoleName, UserId};

use super::RepositoryError;

/// A user row as the admin panel sees it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ManagedUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<RoleName>,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
}

impl ManagedUser {
    /// Typed user id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.id)
    }

    /// Whether this user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(RoleName::Admin)
    }
}

/// Listing filter for the user management page.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<RoleName>,
    pub search: Option<String>,
}

/// Credentials row for admin login.
#[derive(Debug, sqlx::FromRow)]
pub struct LoginRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<RoleName>,
    pub is_locked: bool,
    pub is_active: bool,
}

/// Repository for user management.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch login data by username or email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_login(
        &self,
        username_or_email: &str,
    ) -> Result<Option<LoginRow>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginRow>(
            r"
            SELECT u.id, u.username, u.email, u.password_hash,
                   r.name AS role, u.is_locked, u.is_active
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE u.username = $1 OR u.email = $1
            ",
        )
        .bind(username_or_email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// All users, newest first, with optional role and username filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &UserFilter) -> Result<Vec<ManagedUser>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r"
            SELECT u.id, u.username, u.email, u.phone, r.name AS role,
                   u.is_locked, u.created_at
            FROM users u
            LEFT JOIN roles r ON r.id = u.role_id
            WHERE TRUE
            ",
        );

        if let Some(role) = filter.role {
            builder.push(" AND r.name = ");
            builder.push_bind(role);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            builder.push(" AND u.username ILIKE ");
            builder.push_bind(format!("%{search}%"));
        }
        builder.push(" ORDER BY u.created_at DESC");

        let rows: Vec<ManagedUser> = builder.build_query_as().fetch_all(self.pool).await?;
        Ok(rows)
    }

    /// Flip a user's lock flag; returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn toggle_lock(&self, id: UserId) -> Result<bool, RepositoryError> {
        let row: Option<(bool,)> = sqlx::query_as(
            r"
            UPDATE users
            SET is_locked = NOT is_locked, updated_at = NOW()
            WHERE id = $1
            RETURNING is_locked
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(|(locked,)| locked).ok_or(RepositoryError::NotFound)
    }

    /// Set a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_role(&self, id: UserId, role: RoleName) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET role_id = (SELECT id FROM roles WHERE name = $1), updated_at = NOW()
            WHERE id = $2
            ",
        )
        .bind(role)
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
