//! Session-stored types.

use serde::{Deserialize, Serialize};

use mobigear_core::{Email, UserId};

/// Session-stored admin identity.
///
/// Only users whose role is `admin` ever get written into the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub username: String,
    pub email: Email,
}

/// Session keys.
pub mod session_keys {
    /// Key for the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for pending flash messages.
    pub const FLASH: &str = "flash_messages";
}
