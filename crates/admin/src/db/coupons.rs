//! Coupon listing repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mobigear_core::{DiscountType, Price};

use super::RepositoryError;

/// A coupon row as the admin panel sees it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ManagedCoupon {
    pub id: i32,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_amount: Price,
    pub max_discount: Option<Price>,
    pub usage_limit: i32,
    pub used_count: i32,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl ManagedCoupon {
    /// Whether the coupon is currently redeemable.
    #[must_use]
    pub fn is_currently_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= now
            && now <= self.valid_to
            && self.used_count < self.usage_limit
    }
}

/// Repository for coupon listing.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<ManagedCoupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, ManagedCoupon>(
            r"
            SELECT id, code, discount_type, discount_value, min_order_amount,
                   max_discount, usage_limit, used_count, is_active,
                   valid_from, valid_to
            FROM coupons
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
