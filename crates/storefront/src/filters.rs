//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Formats a timestamp as `DD/MM/YYYY HH:MM`.
///
/// Usage in templates: `{{ order.created_at|dt_short }}`
#[askama::filter_fn]
pub fn dt_short(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%d/%m/%Y %H:%M").to_string())
}

/// Formats a timestamp as `HH:MM`.
///
/// Usage in templates: `{{ message.created_at|time_short }}`
#[askama::filter_fn]
pub fn time_short(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%H:%M").to_string())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(Utc::now().year())
}
