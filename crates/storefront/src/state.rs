//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::assistant::AssistantClient;
use crate::chat::ChatHub;
use crate::config::StorefrontConfig;
use crate::models::product::Category;
use crate::services::email::EmailService;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// How long the category navigation cache stays fresh.
const NAV_CACHE_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    assistant: Option<AssistantClient>,
    email: Option<EmailService>,
    chat: ChatHub,
    nav_categories: moka::future::Cache<&'static str, Arc<Vec<Category>>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let assistant = config.assistant.as_ref().map(AssistantClient::new);
        let email = config
            .email
            .as_ref()
            .map(EmailService::new)
            .transpose()?;
        let chat = ChatHub::new(pool.clone());

        let nav_categories = moka::future::Cache::builder()
            .time_to_live(NAV_CACHE_TTL)
            .max_capacity(1)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                assistant,
                email,
                chat,
                nav_categories,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the AI assistant client, when configured.
    #[must_use]
    pub fn assistant(&self) -> Option<&AssistantClient> {
        self.inner.assistant.as_ref()
    }

    /// Get the email service, when configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get the chat hub.
    #[must_use]
    pub fn chat(&self) -> &ChatHub {
        &self.inner.chat
    }

    /// Active categories for the navigation bar, cached briefly.
    ///
    /// Falls back to an empty list when the catalog query fails; navigation
    /// should never take a page down.
    pub async fn nav_categories(&self) -> Arc<Vec<Category>> {
        let pool = self.inner.pool.clone();
        self.inner
            .nav_categories
            .get_with("nav", async move {
                let repo = crate::db::products::ProductRepository::new(&pool);
                match repo.list_categories(None).await {
                    Ok(categories) => Arc::new(categories),
                    Err(e) => {
                        tracing::warn!("Failed to load nav categories: {e}");
                        Arc::new(Vec::new())
                    }
                }
            })
            .await
    }
}
