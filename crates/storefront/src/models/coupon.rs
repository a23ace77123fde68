//! Coupon model and discount calculation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use mobigear_core::{CouponId, DiscountType, Price};

/// A discount code with a validity window and usage cap.
#[derive(Debug, Clone)]
pub struct Coupon {
    pub id: CouponId,
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
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon can currently be redeemed: active, inside its
    /// validity window, and under its usage limit.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= now
            && now <= self.valid_to
            && self.used_count < self.usage_limit
    }

    /// Discount amount for an order total.
    ///
    /// Zero when the total is below the minimum order amount. Percent
    /// coupons are capped at `max_discount` when set; the result is always
    /// capped at the order total so an order can never go negative.
    #[must_use]
    pub fn calculate_discount(&self, order_total: Price) -> Price {
        if order_total < self.min_order_amount {
            return Price::ZERO;
        }

        let discount = match self.discount_type {
            DiscountType::Percent => {
                let raw = Price::new(
                    order_total.amount() * self.discount_value / Decimal::from(100),
                );
                match self.max_discount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
            DiscountType::Fixed => Price::new(self.discount_value),
        };

        discount.min(order_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(
        discount_type: DiscountType,
        value: i64,
        min_order: i64,
        max_discount: Option<i64>,
    ) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: CouponId::new(1),
            code: "WELCOME10".to_owned(),
            discount_type,
            discount_value: Decimal::from(value),
            min_order_amount: Price::from_vnd(min_order),
            max_discount: max_discount.map(Price::from_vnd),
            usage_limit: 100,
            used_count: 0,
            is_active: true,
            valid_from: now - Duration::days(1),
            valid_to: now + Duration::days(29),
            created_at: now,
        }
    }

    #[test]
    fn test_welcome10_percent_discount() {
        // WELCOME10: 10%, min 200.000đ, capped at 50.000đ
        let welcome = coupon(DiscountType::Percent, 10, 200_000, Some(50_000));

        // 250.000đ order -> 25.000đ discount
        assert_eq!(
            welcome.calculate_discount(Price::from_vnd(250_000)),
            Price::from_vnd(25_000)
        );
        // 800.000đ order -> capped at 50.000đ
        assert_eq!(
            welcome.calculate_discount(Price::from_vnd(800_000)),
            Price::from_vnd(50_000)
        );
        // Below the minimum -> nothing
        assert_eq!(
            welcome.calculate_discount(Price::from_vnd(150_000)),
            Price::ZERO
        );
    }

    #[test]
    fn test_percent_without_cap() {
        let sale = coupon(DiscountType::Percent, 20, 0, None);
        assert_eq!(
            sale.calculate_discount(Price::from_vnd(1_000_000)),
            Price::from_vnd(200_000)
        );
    }

    #[test]
    fn test_fixed_discount_capped_at_total() {
        let freeship = coupon(DiscountType::Fixed, 30_000, 0, None);
        assert_eq!(
            freeship.calculate_discount(Price::from_vnd(500_000)),
            Price::from_vnd(30_000)
        );
        // Fixed value larger than the order total clamps to the total
        assert_eq!(
            freeship.calculate_discount(Price::from_vnd(20_000)),
            Price::from_vnd(20_000)
        );
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Percent, 10, 0, None);
        assert!(c.is_valid(now));

        c.is_active = false;
        assert!(!c.is_valid(now));
        c.is_active = true;

        assert!(!c.is_valid(now - Duration::days(2)));
        assert!(!c.is_valid(now + Duration::days(30)));
    }

    #[test]
    fn test_usage_limit_exhausted() {
        let mut c = coupon(DiscountType::Percent, 10, 0, None);
        c.used_count = c.usage_limit;
        assert!(!c.is_valid(Utc::now()));
    }
}
