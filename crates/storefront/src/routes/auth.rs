//! Authentication route handlers: register, login, logout, password reset.

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

use crate::filters;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::flash;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::models::user::User;
use crate::routes::context::PageContext;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email_or_phone: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

/// `next` redirect target after login.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub username: String,
    pub email: String,
    pub phone: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub next: String,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub page: PageContext,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub page: PageContext,
    pub token: String,
    pub error: Option<String>,
}

fn current_user_of(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin(),
    }
}

/// Only allow same-site redirect targets.
fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
        _ => "/".to_owned(),
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<RegisterTemplate> {
    let page = PageContext::build(&state, &session, user).await;
    Ok(RegisterTemplate {
        page,
        error: None,
        username: String::new(),
        email: String::new(),
        phone: String::new(),
    })
}

/// Handle registration form submission.
///
/// On success the new user is logged in immediately, like the storefront
/// always has done.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    let phone = Some(form.phone.as_str()).filter(|p| !p.trim().is_empty());
    let result = service
        .register(
            &form.username,
            &form.email,
            phone,
            &form.password,
            &form.password_confirm,
        )
        .await;

    match result {
        Ok(user) => {
            let current = current_user_of(&user);
            set_current_user(&session, &current).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            flash::success(&session, "Welcome! Your account is ready.").await;
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(e.into()),
        Err(e) => {
            // Validation failures re-render the form with the error
            let message = AppError::from(e).to_user_message();
            let page = PageContext::build(&state, &session, None).await;
            Ok(RegisterTemplate {
                page,
                error: Some(message),
                username: form.username,
                email: form.email,
                phone: form.phone,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> Result<LoginTemplate> {
    let page = PageContext::build(&state, &session, user).await;
    Ok(LoginTemplate {
        page,
        error: None,
        next: sanitize_next(query.next.as_deref()),
    })
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    match service.login(&form.username, &form.password).await {
        Ok(user) => {
            let current = current_user_of(&user);
            set_current_user(&session, &current).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            flash::success(&session, format!("Welcome back, {}!", user.username)).await;
            Ok(Redirect::to(&sanitize_next(query.next.as_deref())).into_response())
        }
        Err(AuthError::AccountLocked) => {
            let page = PageContext::build(&state, &session, None).await;
            Ok(LoginTemplate {
                page,
                error: Some("This account has been locked.".to_owned()),
                next: sanitize_next(query.next.as_deref()),
            }
            .into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let page = PageContext::build(&state, &session, None).await;
            Ok(LoginTemplate {
                page,
                error: Some("Wrong username or password.".to_owned()),
                next: sanitize_next(query.next.as_deref()),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log the user out, dropping the whole session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    session.flush().await?;
    clear_sentry_user();
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Password Reset
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<ForgotPasswordTemplate> {
    let page = PageContext::build(&state, &session, user).await;
    Ok(ForgotPasswordTemplate { page })
}

/// Handle the forgot password form: create a token and email a reset link.
#[instrument(skip(state, session, form))]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    match service.start_password_reset(&form.email_or_phone).await? {
        Some((user, token)) => {
            let reset_link = format!(
                "{}/auth/reset-password/{token}",
                state.config().base_url.trim_end_matches('/')
            );

            if let Some(email) = state.email() {
                if let Err(e) = email
                    .send_password_reset(user.email.as_str(), &user.username, &reset_link)
                    .await
                {
                    tracing::error!("Failed to send reset email: {e}");
                    flash::error(&session, "Could not send the reset email. Try again later.")
                        .await;
                    return Ok(Redirect::to("/auth/forgot-password").into_response());
                }
            } else {
                tracing::warn!("SMTP not configured; reset link not delivered");
            }

            flash::success(&session, "A password reset link has been sent to your email.").await;
        }
        None => {
            flash::error(&session, "No account matches that email or phone number.").await;
        }
    }

    Ok(Redirect::to("/auth/forgot-password").into_response())
}

/// Display the reset password page for a token.
#[instrument(skip(state, session))]
pub async fn reset_password_page(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    match service.check_reset_token(&token).await {
        Ok(()) => {
            let page = PageContext::build(&state, &session, None).await;
            Ok(ResetPasswordTemplate {
                page,
                token,
                error: None,
            }
            .into_response())
        }
        Err(AuthError::TokenExpired) => {
            flash::error(&session, "This reset link has expired.").await;
            Ok(Redirect::to("/auth/forgot-password").into_response())
        }
        Err(AuthError::TokenNotFound) => {
            Err(AppError::NotFound("reset token".to_owned()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle the reset password form submission.
#[instrument(skip(state, session, form))]
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response> {
    let service = AuthService::new(state.pool());

    match service
        .reset_password(&token, &form.password, &form.password_confirm)
        .await
    {
        Ok(()) => {
            flash::success(&session, "Password updated. Please sign in.").await;
            Ok(Redirect::to("/auth/login").into_response())
        }
        Err(AuthError::TokenExpired) => {
            flash::error(&session, "This reset link has expired.").await;
            Ok(Redirect::to("/auth/forgot-password").into_response())
        }
        Err(AuthError::TokenNotFound) => Err(AppError::NotFound("reset token".to_owned())),
        Err(e @ (AuthError::WeakPassword(_) | AuthError::PasswordMismatch)) => {
            let message = AppError::from(e).to_user_message();
            let page = PageContext::build(&state, &session, None).await;
            Ok(ResetPasswordTemplate {
                page,
                token,
                error: Some(message),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}
