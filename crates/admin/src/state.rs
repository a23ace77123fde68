//! Application state shared across admin handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::chat::ChatHub;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    chat: ChatHub,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let chat = ChatHub::new(pool.clone());
        Self {
            inner: Arc::new(AppStateInner { config, pool, chat }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the chat hub.
    #[must_use]
    pub fn chat(&self) -> &ChatHub {
        &self.inner.chat
    }
}
