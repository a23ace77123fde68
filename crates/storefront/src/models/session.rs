//! Session-stored types.

use serde::{Deserialize, Serialize};

use mobigear_core::{Email, ProductId, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub is_admin: bool,
}

/// Buy-now payload stashed between the product page and its checkout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuyNow {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Session keys.
pub mod session_keys {
    /// Key for the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart lines.
    pub const CART: &str = "cart";

    /// Key for the applied coupon code.
    pub const COUPON_CODE: &str = "coupon_code";

    /// Key for the buy-now payload.
    pub const BUY_NOW: &str = "buy_now";

    /// Key for pending flash messages.
    pub const FLASH: &str = "flash_messages";
}
