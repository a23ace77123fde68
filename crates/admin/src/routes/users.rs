//! User management handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::{RoleName, UserId};

use crate::db::users::{ManagedUser, UserFilter, UserRepository};
use crate::error::Result;
use crate::filters;
use crate::flash;
use crate::middleware::RequireAdmin;
use crate::routes::context::AdminContext;
use crate::state::AppState;

/// Listing filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub search: String,
}

/// User management page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub ctx: AdminContext,
    pub users: Vec<ManagedUser>,
    pub role_filter: String,
    pub search: String,
}

/// User listing with role/username filters.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<UserListQuery>,
) -> Result<UsersTemplate> {
    let filter = UserFilter {
        role: query.role.parse::<RoleName>().ok(),
        search: Some(query.search.clone()).filter(|s| !s.is_empty()),
    };

    let users = UserRepository::new(state.pool()).list(&filter).await?;
    let ctx = AdminContext::build(&session, &admin, "/users").await;

    Ok(UsersTemplate {
        ctx,
        users,
        role_filter: query.role,
        search: query.search,
    })
}

/// Lock or unlock a user. Admins cannot lock themselves.
#[instrument(skip(state, session, admin))]
pub async fn toggle_lock(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<i32>,
) -> Result<Response> {
    if UserId::new(user_id) == admin.id {
        flash::error(&session, "You cannot lock your own account!").await;
        return Ok(Redirect::to("/users").into_response());
    }

    let locked = UserRepository::new(state.pool())
        .toggle_lock(UserId::new(user_id))
        .await?;

    let action = if locked { "locked" } else { "unlocked" };
    flash::success(&session, format!("Account {action}.")).await;
    Ok(Redirect::to("/users").into_response())
}

/// Role change form data.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// Change a user's role.
#[instrument(skip(state, session, admin, form))]
pub async fn change_role(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<i32>,
    Form(form): Form<RoleForm>,
) -> Result<Response> {
    let Ok(role) = form.role.parse::<RoleName>() else {
        flash::error(&session, "Unknown role.").await;
        return Ok(Redirect::to("/users").into_response());
    };

    if UserId::new(user_id) == admin.id && role != RoleName::Admin {
        flash::error(&session, "You cannot demote your own account!").await;
        return Ok(Redirect::to("/users").into_response());
    }

    UserRepository::new(state.pool())
        .set_role(UserId::new(user_id), role)
        .await?;

    flash::success(&session, "Role updated.").await;
    Ok(Redirect::to("/users").into_response())
}
