//! Assistant error types.

use thiserror::Error;

/// Errors from the Anthropic Messages API client.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({error_type}): {message}")]
    Api {
        error_type: String,
        message: String,
    },

    /// Rate limited; retry after the given number of seconds.
    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Invalid API key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse a response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The response contained no usable text.
    #[error("empty response")]
    EmptyResponse,
}

/// Error response body from the API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error details from the API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
