//! Request and response types for the Anthropic Messages API.

use serde::{Deserialize, Serialize};

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    /// A user-role message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

/// Request body for the Messages API.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// One block of response content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

/// Response body from the Messages API.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl ChatResponse {
    /// Concatenated text of all content blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| {
                let ContentBlock::Text { text } = block;
                text.as_str()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_concatenates_blocks() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "text", "text": "Xin chào! "},
                    {"type": "text", "text": "Mình gợi ý tai nghe TWS Pro."}
                ],
                "stop_reason": "end_turn"
            }"#,
        )
        .expect("valid response JSON");

        assert_eq!(response.text(), "Xin chào! Mình gợi ý tai nghe TWS Pro.");
    }

    #[test]
    fn test_request_skips_absent_fields() {
        let request = ChatRequest {
            model: "claude-sonnet-4-5".to_owned(),
            max_tokens: 500,
            messages: vec![Message::user("hi")],
            system: None,
            temperature: None,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("system").is_none());
        assert!(json.get("temperature").is_none());
    }
}
