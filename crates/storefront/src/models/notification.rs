//! Notification feed model.

use chrono::{DateTime, Utc};

use mobigear_core::{NotificationId, NotificationKind, UserId};

/// A per-user notification with a read flag and optional deep link.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
