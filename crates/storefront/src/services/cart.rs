//! Cart resolution and coupon application.
//!
//! The session only stores product ids and quantities ([`crate::models::Cart`]);
//! this service resolves them against the catalog and computes totals.

use tower_sessions::Session;

use mobigear_core::Price;

use crate::db::RepositoryError;
use crate::db::coupons::CouponRepository;
use crate::db::products::ProductRepository;
use crate::models::coupon::Coupon;
use crate::models::product::Product;
use crate::models::{Cart, session_keys};

/// A cart line resolved against the live catalog.
#[derive(Debug, Clone)]
pub struct ResolvedCartItem {
    pub product: Product,
    pub quantity: u32,
}

impl ResolvedCartItem {
    /// Unit price (the product's current final price).
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.product.final_price()
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price() * self.quantity
    }
}

/// A fully resolved cart.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCart {
    pub items: Vec<ResolvedCartItem>,
}

impl ResolvedCart {
    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(ResolvedCartItem::line_total).sum()
    }

    /// Total number of items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// True when nothing resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read the cart from the session (empty cart when absent).
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Write the cart back to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Drop the cart from the session.
pub async fn clear_cart(session: &Session) {
    if let Err(e) = session.remove::<Cart>(session_keys::CART).await {
        tracing::warn!("Failed to clear cart: {e}");
    }
}

/// The coupon code currently applied, if any.
pub async fn applied_coupon_code(session: &Session) -> Option<String> {
    session
        .get::<String>(session_keys::COUPON_CODE)
        .await
        .ok()
        .flatten()
}

/// Store the applied coupon code.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn apply_coupon_code(
    session: &Session,
    code: &str,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::COUPON_CODE, code).await
}

/// Remove the applied coupon code.
pub async fn remove_coupon_code(session: &Session) {
    if let Err(e) = session.remove::<String>(session_keys::COUPON_CODE).await {
        tracing::warn!("Failed to remove coupon code: {e}");
    }
}

/// Cart service, resolving session state against the database.
pub struct CartService<'a> {
    pool: &'a sqlx::PgPool,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the session cart against the catalog.
    ///
    /// Lines whose product has vanished or been deactivated are silently
    /// dropped, matching what the customer can actually buy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the catalog query fails.
    pub async fn resolve(&self, cart: &Cart) -> Result<ResolvedCart, RepositoryError> {
        if cart.is_empty() {
            return Ok(ResolvedCart::default());
        }

        let ids: Vec<_> = cart.lines.iter().map(|l| l.product_id).collect();
        let products = ProductRepository::new(self.pool)
            .get_active_by_ids(&ids)
            .await?;

        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            if let Some(product) = products.iter().find(|p| p.id == line.product_id) {
                items.push(ResolvedCartItem {
                    product: product.clone(),
                    quantity: line.quantity,
                });
            }
        }

        Ok(ResolvedCart { items })
    }

    /// Resolve the session coupon against a subtotal.
    ///
    /// A stale code (unknown, expired, exhausted) is removed from the
    /// session and yields no discount.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the coupon query fails.
    pub async fn resolve_coupon(
        &self,
        session: &Session,
        subtotal: Price,
    ) -> Result<Option<(Coupon, Price)>, RepositoryError> {
        let Some(code) = applied_coupon_code(session).await else {
            return Ok(None);
        };

        let coupon = CouponRepository::new(self.pool).get_by_code(&code).await?;

        match coupon {
            Some(coupon) if coupon.is_valid(chrono::Utc::now()) => {
                let discount = coupon.calculate_discount(subtotal);
                Ok(Some((coupon, discount)))
            }
            _ => {
                remove_coupon_code(session).await;
                Ok(None)
            }
        }
    }
}
