//! Order placement.
//!
//! Gathers the resolved cart, shipping details, and coupon into one
//! transactional order creation, then handles the follow-ups: QR code for
//! bank transfers, an order notification, and the confirmation email.
//! Follow-up failures are logged but never fail an already-placed order.

use rust_decimal::Decimal;
use sqlx::PgPool;

use mobigear_core::{NotificationKind, Price, UserId};

use crate::db::RepositoryError;
use crate::db::notifications::NotificationRepository;
use crate::db::orders::{NewOrder, NewOrderItem, OrderRepository};
use crate::models::coupon::Coupon;
use crate::models::order::{Order, PaymentMethod, order_total};
use crate::services::email::EmailService;
use crate::services::qr;

/// Shipping details captured from the checkout form.
#[derive(Debug, Clone)]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub note: String,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order.
    ///
    /// Computes the pricing snapshot, creates the order and its items in one
    /// transaction (stock and coupon counters included), then generates the
    /// bank-transfer QR, writes the order notification, and sends the
    /// confirmation email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when stock or the coupon ran out
    /// under our feet, `RepositoryError::Database` for other failures.
    pub async fn place_order(
        &self,
        user_id: UserId,
        details: ShippingDetails,
        payment_method: &PaymentMethod,
        items: Vec<NewOrderItem>,
        coupon: Option<&Coupon>,
        shipping_fee: Price,
        email_service: Option<&EmailService>,
    ) -> Result<Order, RepositoryError> {
        let subtotal: Price = items.iter().map(|i| i.price * i.quantity).sum();
        let discount = coupon.map_or(Price::ZERO, |c| c.calculate_discount(subtotal));
        let total = order_total(subtotal, shipping_fee, discount);

        let orders = OrderRepository::new(self.pool);
        let mut order = orders
            .create(&NewOrder {
                user_id,
                full_name: details.full_name,
                phone: details.phone,
                email: details.email,
                address: details.address,
                latitude: details.latitude,
                longitude: details.longitude,
                note: details.note,
                payment_method_id: payment_method.id,
                subtotal,
                shipping_fee,
                coupon_id: coupon.map(|c| c.id),
                discount,
                total,
                items,
            })
            .await?;

        // Bank transfers get a QR code rendered once at creation.
        if payment_method.supports_qr() {
            let payload = qr::transfer_payload(payment_method, order.total, order.id, &order.full_name);
            match qr::render_svg(&payload) {
                Ok(svg) => {
                    orders.set_qr_code(order.id, &svg).await?;
                    order.qr_code_svg = Some(svg);
                }
                Err(e) => tracing::error!(order_id = %order.id, "QR generation failed: {e}"),
            }
        }

        self.notify_order_placed(&order).await;
        self.send_confirmation(&order, payment_method, email_service)
            .await;

        Ok(order)
    }

    async fn notify_order_placed(&self, order: &Order) {
        let result = NotificationRepository::new(self.pool)
            .create(
                order.user_id,
                "Order placed!",
                &format!(
                    "Order #{} has been created. Total: {}",
                    order.id,
                    order.total.display()
                ),
                NotificationKind::Order,
                &format!("/orders/{}", order.id),
            )
            .await;

        if let Err(e) = result {
            tracing::error!(order_id = %order.id, "Failed to create order notification: {e}");
        }
    }

    async fn send_confirmation(
        &self,
        order: &Order,
        payment_method: &PaymentMethod,
        email_service: Option<&EmailService>,
    ) {
        let Some(service) = email_service else {
            return;
        };

        let result = service
            .send_order_confirmation(
                &order.email,
                &order.full_name,
                &order.id.to_string(),
                &order.total.display(),
                &payment_method.name,
                &order.address,
            )
            .await;

        if let Err(e) = result {
            // Mirror of the original's fail_silently: the order stands even
            // when the confirmation cannot be delivered.
            tracing::warn!(order_id = %order.id, "Failed to send order confirmation: {e}");
        }
    }

    /// Cancel an order, restoring stock, and notify the customer.
    ///
    /// The caller must have verified the order is still cancellable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn cancel_order(&self, order: &Order) -> Result<(), RepositoryError> {
        OrderRepository::new(self.pool).cancel(order.id).await?;

        let result = NotificationRepository::new(self.pool)
            .create(
                order.user_id,
                "Order cancelled",
                &format!("Order #{} has been cancelled.", order.id),
                NotificationKind::Order,
                &format!("/orders/{}", order.id),
            )
            .await;

        if let Err(e) = result {
            tracing::error!(order_id = %order.id, "Failed to create cancellation notification: {e}");
        }

        Ok(())
    }
}
