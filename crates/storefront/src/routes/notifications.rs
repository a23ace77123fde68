//! Notification feed handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::NotificationId;

use crate::db::notifications::NotificationRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::notification::Notification;
use crate::routes::context::PageContext;
use crate::state::AppState;

/// Notification display data.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: i32,
    pub title: String,
    pub message: String,
    pub kind: &'static str,
    pub link: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Notification> for NotificationView {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.as_i32(),
            title: n.title.clone(),
            message: n.message.clone(),
            kind: n.kind.label(),
            link: n.link.clone(),
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// Notification list page template.
#[derive(Template, WebTemplate)]
#[template(path = "notifications/list.html")]
pub struct NotificationListTemplate {
    pub page: PageContext,
    pub notifications: Vec<NotificationView>,
}

/// The user's notification feed, newest first.
#[instrument(skip(state, session, user))]
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<NotificationListTemplate> {
    let notifications = NotificationRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    let page = PageContext::build(&state, &session, Some(user)).await;

    Ok(NotificationListTemplate {
        page,
        notifications: notifications.iter().map(NotificationView::from).collect(),
    })
}

/// Mark a single notification read (JSON).
#[instrument(skip(state, user))]
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(notification_id): Path<i32>,
) -> Result<Response> {
    let marked = NotificationRepository::new(state.pool())
        .mark_read(NotificationId::new(notification_id), user.id)
        .await?;

    if !marked {
        return Err(AppError::NotFound(format!(
            "notification {notification_id}"
        )));
    }

    Ok(Json(json!({"status": "success"})).into_response())
}

/// Mark all notifications read (JSON).
#[instrument(skip(state, user))]
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    NotificationRepository::new(state.pool())
        .mark_all_read(user.id)
        .await?;

    Ok(Json(json!({"status": "success"})).into_response())
}

/// Unread count for the navbar badge (JSON).
#[instrument(skip(state, user))]
pub async fn unread_count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let count = NotificationRepository::new(state.pool())
        .unread_count(user.id)
        .await?;

    Ok(Json(json!({"count": count})).into_response())
}
