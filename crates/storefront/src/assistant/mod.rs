//! AI shopping assistant.
//!
//! A thin client for the Anthropic Messages API plus a catalog-derived
//! system prompt. The assistant answers a single customer question per
//! request; there is no conversation state or streaming.

mod client;
mod error;
mod prompt;
mod types;

pub use client::AssistantClient;
pub use error::AssistantError;
pub use prompt::build_system_prompt;
pub use types::{ChatRequest, ChatResponse, ContentBlock, Message};
