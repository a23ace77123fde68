//! Order, order item, and payment method models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use mobigear_core::{
    CouponId, OrderId, OrderItemId, OrderStatus, PaymentMethodId, Price, ProductId, UserId,
};

/// Payment method code for manual bank transfer (triggers QR generation).
pub const BANK_TRANSFER_CODE: &str = "bank_transfer";

/// A way to pay for an order.
#[derive(Debug, Clone)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub code: String,
    pub description: String,
    pub icon: String,
    pub is_active: bool,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_holder: String,
}

impl PaymentMethod {
    /// Whether this method is a bank transfer with usable bank details.
    #[must_use]
    pub fn supports_qr(&self) -> bool {
        self.code == BANK_TRANSFER_CODE && !self.bank_account.is_empty()
    }
}

/// An order: a snapshot of the cart plus shipping and payment info.
///
/// `total = subtotal + shipping_fee - discount`, computed once at creation
/// and never recomputed.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub note: String,
    pub payment_method_id: Option<PaymentMethodId>,
    pub payment_method_name: Option<String>,
    pub is_paid: bool,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub coupon_id: Option<CouponId>,
    pub discount: Price,
    pub total: Price,
    pub qr_code_svg: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on an order, with the unit price frozen at purchase time.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub quantity: i32,
    pub price: Price,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * u32::try_from(self.quantity).unwrap_or(0)
    }
}

/// Order total from its pricing components.
#[must_use]
pub fn order_total(subtotal: Price, shipping_fee: Price, discount: Price) -> Price {
    (subtotal + shipping_fee).saturating_sub(discount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total() {
        assert_eq!(
            order_total(
                Price::from_vnd(250_000),
                Price::from_vnd(30_000),
                Price::from_vnd(25_000)
            ),
            Price::from_vnd(255_000)
        );
        // A discount can never push the total below zero
        assert_eq!(
            order_total(Price::from_vnd(10_000), Price::ZERO, Price::from_vnd(50_000)),
            Price::ZERO
        );
    }

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: ProductId::new(1),
            product_name: "Tai nghe Bluetooth TWS Pro".to_owned(),
            product_slug: "product-5".to_owned(),
            quantity: 3,
            price: Price::from_vnd(299_000),
        };
        assert_eq!(item.line_total(), Price::from_vnd(897_000));
    }

    #[test]
    fn test_supports_qr() {
        let mut method = PaymentMethod {
            id: PaymentMethodId::new(1),
            name: "Chuyển khoản ngân hàng".to_owned(),
            code: BANK_TRANSFER_CODE.to_owned(),
            description: String::new(),
            icon: String::new(),
            is_active: true,
            bank_name: "Vietcombank".to_owned(),
            bank_account: "1234567890".to_owned(),
            bank_holder: "MOBIGEAR".to_owned(),
        };
        assert!(method.supports_qr());

        method.bank_account = String::new();
        assert!(!method.supports_qr());

        method.bank_account = "1234567890".to_owned();
        method.code = "cod".to_owned();
        assert!(!method.supports_qr());
    }
}
