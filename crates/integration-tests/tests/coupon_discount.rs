//! Integration tests for coupon discount calculation.
//!
//! These mirror the acceptance scenario the store runs on: WELCOME10 on a
//! 250.000đ order yields a 25.000đ discount, capped at 50.000đ.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use mobigear_core::{CouponId, DiscountType, Price};
use mobigear_storefront::models::Coupon;

fn make_coupon(
    code: &str,
    discount_type: DiscountType,
    value: i64,
    min_order: i64,
    max_discount: Option<i64>,
    usage_limit: i32,
) -> Coupon {
    let now = Utc::now();
    Coupon {
        id: CouponId::new(1),
        code: code.to_owned(),
        discount_type,
        discount_value: Decimal::from(value),
        min_order_amount: Price::from_vnd(min_order),
        max_discount: max_discount.map(Price::from_vnd),
        usage_limit,
        used_count: 0,
        is_active: true,
        valid_from: now - Duration::days(1),
        valid_to: now + Duration::days(29),
        created_at: now,
    }
}

fn welcome10() -> Coupon {
    make_coupon("WELCOME10", DiscountType::Percent, 10, 200_000, Some(50_000), 100)
}

#[test]
fn test_welcome10_on_250k_order() {
    let discount = welcome10().calculate_discount(Price::from_vnd(250_000));
    assert_eq!(discount, Price::from_vnd(25_000));
}

#[test]
fn test_welcome10_caps_at_50k() {
    let discount = welcome10().calculate_discount(Price::from_vnd(2_000_000));
    assert_eq!(discount, Price::from_vnd(50_000));
}

#[test]
fn test_welcome10_below_minimum_gives_nothing() {
    let discount = welcome10().calculate_discount(Price::from_vnd(199_999));
    assert_eq!(discount, Price::ZERO);
}

#[test]
fn test_welcome10_exactly_at_minimum_applies() {
    let discount = welcome10().calculate_discount(Price::from_vnd(200_000));
    assert_eq!(discount, Price::from_vnd(20_000));
}

#[test]
fn test_freeship_fixed_discount() {
    let freeship = make_coupon("FREESHIP", DiscountType::Fixed, 30_000, 300_000, None, 50);
    assert_eq!(
        freeship.calculate_discount(Price::from_vnd(450_000)),
        Price::from_vnd(30_000)
    );
    // Below minimum
    assert_eq!(
        freeship.calculate_discount(Price::from_vnd(250_000)),
        Price::ZERO
    );
}

#[test]
fn test_fixed_discount_never_exceeds_total() {
    let big = make_coupon("BIG", DiscountType::Fixed, 500_000, 0, None, 10);
    assert_eq!(
        big.calculate_discount(Price::from_vnd(120_000)),
        Price::from_vnd(120_000)
    );
}

#[test]
fn test_expired_coupon_is_invalid() {
    let mut coupon = welcome10();
    coupon.valid_to = Utc::now() - Duration::hours(1);
    assert!(!coupon.is_valid(Utc::now()));
}

#[test]
fn test_exhausted_coupon_is_invalid() {
    let mut coupon = welcome10();
    coupon.used_count = coupon.usage_limit;
    assert!(!coupon.is_valid(Utc::now()));
}

#[test]
fn test_inactive_coupon_is_invalid() {
    let mut coupon = welcome10();
    coupon.is_active = false;
    assert!(!coupon.is_valid(Utc::now()));
}
