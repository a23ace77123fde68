//! Type-safe price representation using decimal arithmetic.
//!
//! All MobiGear prices are Vietnamese đồng (VND), which has no minor unit:
//! amounts are whole numbers of đồng. The display format uses dot thousands
//! separators with a trailing `đ`, e.g. `1.250.000đ`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A VND price.
///
/// Thin wrapper over [`Decimal`] so that money is never confused with other
/// numeric quantities. Arithmetic is exact decimal arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero đồng.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of đồng.
    #[must_use]
    pub fn from_vnd(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// True if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Clamp to at most `other`.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Subtract, clamping at zero instead of going negative.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Format the price for display, e.g. `1.250.000đ`.
    ///
    /// Amounts are rounded to whole đồng before formatting.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.0.round();
        let negative = rounded.is_sign_negative();
        // normalize() drops any residual scale so "30000.00" never leaks in
        let digits = rounded.abs().trunc().normalize().to_string();

        // Insert a dot before every group of three digits from the right.
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
        let chars: Vec<char> = digits.chars().collect();
        for (i, c) in chars.iter().enumerate() {
            if i > 0 && (chars.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*c);
        }

        if negative {
            format!("-{grouped}đ")
        } else {
            format!("{grouped}đ")
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_grouping() {
        assert_eq!(Price::from_vnd(0).display(), "0đ");
        assert_eq!(Price::from_vnd(999).display(), "999đ");
        assert_eq!(Price::from_vnd(30_000).display(), "30.000đ");
        assert_eq!(Price::from_vnd(1_250_000).display(), "1.250.000đ");
        assert_eq!(Price::from_vnd(123_456_789).display(), "123.456.789đ");
    }

    #[test]
    fn test_arithmetic() {
        let subtotal = Price::from_vnd(250_000);
        let shipping = Price::from_vnd(30_000);
        let discount = Price::from_vnd(25_000);
        assert_eq!(subtotal + shipping - discount, Price::from_vnd(255_000));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(Price::from_vnd(99_000) * 3, Price::from_vnd(297_000));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_vnd(100), Price::from_vnd(200)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_vnd(300));
    }

    #[test]
    fn test_saturating_sub() {
        let small = Price::from_vnd(10_000);
        let big = Price::from_vnd(50_000);
        assert_eq!(small.saturating_sub(big), Price::ZERO);
        assert_eq!(big.saturating_sub(small), Price::from_vnd(40_000));
    }

    #[test]
    fn test_min() {
        let a = Price::from_vnd(50_000);
        let b = Price::from_vnd(80_000);
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }
}
