//! Custom Askama template filters for the admin panel.

#![allow(clippy::unnecessary_wraps)]

use chrono::{DateTime, Utc};

/// Formats a timestamp as `DD/MM/YYYY HH:MM`.
#[askama::filter_fn]
pub fn dt_short(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%d/%m/%Y %H:%M").to_string())
}

/// Formats a timestamp as `HH:MM`.
#[askama::filter_fn]
pub fn time_short(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%H:%M").to_string())
}
