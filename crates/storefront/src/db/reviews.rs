//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mobigear_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::product::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    product_id: i32,
    user_id: i32,
    username: String,
    rating: i16,
    comment: String,
    is_approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            username: row.username,
            rating: row.rating,
            comment: row.comment,
            is_approved: row.is_approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const REVIEW_SELECT: &str = r"
    SELECT v.id, v.product_id, v.user_id, u.username, v.rating, v.comment,
           v.is_approved, v.created_at, v.updated_at
    FROM reviews v
    JOIN users u ON u.id = v.user_id
";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Approved reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_approved(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            "{REVIEW_SELECT} WHERE v.product_id = $1 AND v.is_approved ORDER BY v.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(product_id.as_i32())
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The review a user left on a product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_product_and_user(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<Option<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE v.product_id = $1 AND v.user_id = $2");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(product_id.as_i32())
            .bind(user_id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Create a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed this
    /// product; `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: UserId,
        rating: i16,
        comment: &str,
    ) -> Result<ReviewId, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO reviews (product_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "review already exists"))?;

        Ok(ReviewId::new(id))
    }

    /// Approved ratings for a product (for the average).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn approved_ratings(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<i16>, RepositoryError> {
        let rows: Vec<(i16,)> =
            sqlx::query_as("SELECT rating FROM reviews WHERE product_id = $1 AND is_approved")
                .bind(product_id.as_i32())
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(|(r,)| r).collect())
    }
}
