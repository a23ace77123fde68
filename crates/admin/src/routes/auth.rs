//! Admin login and logout.
//!
//! Password login against the shared users table; only accounts holding the
//! `admin` role may enter.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::{Email, RoleName, UserId};

use crate::db::users::UserRepository;
use crate::error::Result;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Display the login page.
pub async fn login_page() -> LoginTemplate {
    LoginTemplate { error: None }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let repo = UserRepository::new(state.pool());

    let failure = |message: &str| {
        LoginTemplate {
            error: Some(message.to_owned()),
        }
        .into_response()
    };

    let Some(row) = repo.get_for_login(form.username.trim()).await? else {
        return Ok(failure("Wrong username or password."));
    };

    let password_ok = PasswordHash::new(&row.password_hash)
        .map(|hash| {
            Argon2::default()
                .verify_password(form.password.as_bytes(), &hash)
                .is_ok()
        })
        .unwrap_or(false);

    if !password_ok {
        return Ok(failure("Wrong username or password."));
    }

    if row.is_locked || !row.is_active {
        return Ok(failure("This account has been locked."));
    }

    if row.role != Some(RoleName::Admin) {
        tracing::warn!(username = %row.username, "non-admin login attempt on admin panel");
        return Ok(failure("You do not have access to the admin panel."));
    }

    let Ok(email) = Email::parse(&row.email) else {
        return Ok(failure("Account data is invalid; contact support."));
    };

    let admin = CurrentAdmin {
        id: UserId::new(row.id),
        username: row.username,
        email,
    };
    set_current_admin(&session, &admin).await?;

    Ok(Redirect::to("/").into_response())
}

/// Log out and drop the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_admin(&session).await?;
    session.flush().await?;
    Ok(Redirect::to("/auth/login").into_response())
}
