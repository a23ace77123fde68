//! One-shot flash messages carried through the session.
//!
//! Handlers push a message before redirecting; the next rendered page takes
//! and displays them.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Severity of a flash message, mapped to styling in the base template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    /// CSS class suffix used by the base template.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A pending flash message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Queue a flash message for the next rendered page.
pub async fn push(session: &Session, level: FlashLevel, message: impl Into<String>) {
    let mut pending: Vec<Flash> = session
        .get(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    pending.push(Flash {
        level,
        message: message.into(),
    });
    if let Err(e) = session.insert(session_keys::FLASH, &pending).await {
        tracing::warn!("Failed to store flash message: {e}");
    }
}

/// Take (and clear) the pending flash messages.
pub async fn take(session: &Session) -> Vec<Flash> {
    session
        .remove::<Vec<Flash>>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Shorthand for [`push`] with [`FlashLevel::Success`].
pub async fn success(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Success, message).await;
}

/// Shorthand for [`push`] with [`FlashLevel::Info`].
pub async fn info(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Info, message).await;
}

/// Shorthand for [`push`] with [`FlashLevel::Warning`].
pub async fn warning(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Warning, message).await;
}

/// Shorthand for [`push`] with [`FlashLevel::Error`].
pub async fn error(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Error, message).await;
}
