//! Per-page template context.
//!
//! Every full-page template carries a [`PageContext`] so the base layout can
//! render the navigation, cart badge, notification badge, and flash messages
//! without each handler wiring them up by hand.

use tower_sessions::Session;

use crate::db::notifications::NotificationRepository;
use crate::flash::{self, Flash};
use crate::models::CurrentUser;
use crate::models::product::Category;
use crate::services::cart;
use crate::state::AppState;

/// Data the base layout needs on every page.
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub flash: Vec<Flash>,
    pub cart_count: u32,
    pub unread_notifications: i64,
    pub categories: Vec<Category>,
}

impl PageContext {
    /// Assemble the context for the current request.
    pub async fn build(state: &AppState, session: &Session, user: Option<CurrentUser>) -> Self {
        let flash = flash::take(session).await;
        let cart_count = cart::load_cart(session).await.item_count();

        let unread_notifications = match &user {
            Some(u) => NotificationRepository::new(state.pool())
                .unread_count(u.id)
                .await
                .unwrap_or(0),
            None => 0,
        };

        let categories = (*state.nav_categories().await).clone();

        Self {
            user,
            flash,
            cart_count,
            unread_notifications,
            categories,
        }
    }
}
