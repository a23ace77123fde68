//! Profile page and the small account JSON endpoints.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::Email;

use crate::db::RepositoryError;
use crate::db::users::{ProfileUpdate, UserRepository};
use crate::filters;
use crate::error::{AppError, Result};
use crate::flash;
use crate::middleware::RequireAuth;
use crate::routes::context::PageContext;
use crate::state::AppState;

/// Theme brightness bounds (percent).
const BRIGHTNESS_MIN: i32 = 50;
const BRIGHTNESS_MAX: i32 = 100;

/// Profile form values.
#[derive(Debug, Clone, Default)]
pub struct ProfileFormView {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
    pub theme_brightness: i32,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub form: ProfileFormView,
}

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub theme_brightness: Option<i32>,
}

fn parse_coord(value: Option<&str>) -> Option<Decimal> {
    value?.trim().parse::<Decimal>().ok()
}

/// Display the profile page.
#[instrument(skip(state, session, user))]
pub async fn profile_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<ProfileTemplate> {
    let full = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))?;

    let form = ProfileFormView {
        username: full.username.clone(),
        first_name: full.first_name.clone(),
        last_name: full.last_name.clone(),
        email: full.email.to_string(),
        phone: full.phone.clone().unwrap_or_default(),
        address: full.address.clone().unwrap_or_default(),
        latitude: full.latitude.map(|v| v.to_string()).unwrap_or_default(),
        longitude: full.longitude.map(|v| v.to_string()).unwrap_or_default(),
        theme_brightness: full.theme_brightness,
    };

    let page = PageContext::build(&state, &session, Some(user)).await;
    Ok(ProfileTemplate { page, form })
}

/// Handle the profile update form.
#[instrument(skip(state, session, user, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let Ok(email) = Email::parse(form.email.trim()) else {
        flash::error(&session, "Please enter a valid email address.").await;
        return Ok(Redirect::to("/account").into_response());
    };

    let update = ProfileUpdate {
        first_name: form.first_name.trim().to_owned(),
        last_name: form.last_name.trim().to_owned(),
        email,
        phone: Some(form.phone.trim().to_owned()).filter(|p| !p.is_empty()),
        address: Some(form.address.trim().to_owned()).filter(|a| !a.is_empty()),
        latitude: parse_coord(form.latitude.as_deref()),
        longitude: parse_coord(form.longitude.as_deref()),
        theme_brightness: form
            .theme_brightness
            .unwrap_or(BRIGHTNESS_MAX)
            .clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX),
    };

    match UserRepository::new(state.pool())
        .update_profile(user.id, &update)
        .await
    {
        Ok(()) => flash::success(&session, "Profile updated.").await,
        Err(RepositoryError::Conflict(_)) => {
            flash::error(&session, "That email is already in use.").await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/account").into_response())
}

/// Location update form data (from the delivery map).
#[derive(Debug, Deserialize)]
pub struct LocationForm {
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub address: String,
}

/// Update the delivery location from the map widget (JSON).
#[instrument(skip(state, user, form))]
pub async fn update_location(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<LocationForm>,
) -> Result<Response> {
    let (Some(latitude), Some(longitude)) = (
        parse_coord(Some(&form.latitude)),
        parse_coord(Some(&form.longitude)),
    ) else {
        return Ok((
            axum::http::StatusCode::BAD_REQUEST,
            Json(json!({"status": "error"})),
        )
            .into_response());
    };

    let address = Some(form.address.trim()).filter(|a| !a.is_empty());
    UserRepository::new(state.pool())
        .update_location(user.id, latitude, longitude, address)
        .await?;

    Ok(Json(json!({"status": "success"})).into_response())
}

/// Brightness update form data.
#[derive(Debug, Deserialize)]
pub struct BrightnessForm {
    pub brightness: Option<i32>,
}

/// Update the theme brightness preference (JSON).
#[instrument(skip(state, user, form))]
pub async fn update_brightness(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<BrightnessForm>,
) -> Result<Response> {
    let brightness = form
        .brightness
        .unwrap_or(BRIGHTNESS_MAX)
        .clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX);

    UserRepository::new(state.pool())
        .update_brightness(user.id, brightness)
        .await?;

    Ok(Json(json!({"status": "success", "brightness": brightness})).into_response())
}
