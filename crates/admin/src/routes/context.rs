//! Per-page template context for the admin layout.

use tower_sessions::Session;

use crate::flash::{self, Flash};
use crate::models::CurrentAdmin;

/// Data the admin base layout needs on every page.
pub struct AdminContext {
    pub username: String,
    pub flash: Vec<Flash>,
    /// Current path, for highlighting the active sidebar entry.
    pub current_path: String,
}

impl AdminContext {
    /// Assemble the context for the current request.
    pub async fn build(session: &Session, admin: &CurrentAdmin, current_path: &str) -> Self {
        Self {
            username: admin.username.clone(),
            flash: flash::take(session).await,
            current_path: current_path.to_owned(),
        }
    }
}
