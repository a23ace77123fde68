//! Anthropic Messages API client.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::AssistantConfig;

use super::error::{ApiErrorResponse, AssistantError};
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Token budget for a single recommendation reply.
const MAX_TOKENS: u32 = 500;

/// Sampling temperature for recommendations.
const TEMPERATURE: f32 = 0.7;

/// Anthropic Messages API client.
#[derive(Clone)]
pub struct AssistantClient {
    inner: Arc<AssistantClientInner>,
}

struct AssistantClientInner {
    client: reqwest::Client,
    model: String,
}

impl AssistantClient {
    /// Create a new assistant client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(AssistantClientInner {
                client,
                model: config.model.clone(),
            }),
        }
    }

    /// Ask the assistant one question under a catalog-derived system prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error
    /// response, or if the reply contains no text.
    #[instrument(skip(self, system, question), fields(model = %self.inner.model))]
    pub async fn recommend(
        &self,
        system: String,
        question: &str,
    ) -> Result<String, AssistantError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message::user(question)],
            system: Some(system),
            temperature: Some(TEMPERATURE),
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        let chat = self.handle_response(response).await?;
        let text = chat.text();
        if text.is_empty() {
            return Err(AssistantError::EmptyResponse);
        }
        Ok(text)
    }

    /// Handle a response, mapping error statuses to typed errors.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, AssistantError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| AssistantError::Parse(format!("Failed to parse response: {e}")));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(AssistantError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AssistantError::Unauthorized("Invalid API key".to_string()));
        }

        match response.text().await {
            Ok(body) => {
                if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                    Err(AssistantError::Api {
                        error_type: api_error.error.error_type,
                        message: api_error.error.message,
                    })
                } else {
                    Err(AssistantError::Api {
                        error_type: "unknown".to_string(),
                        message: body,
                    })
                }
            }
            Err(e) => Err(AssistantError::Http(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AssistantClient>();
    }

    #[test]
    fn test_assistant_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssistantClient>();
    }
}
