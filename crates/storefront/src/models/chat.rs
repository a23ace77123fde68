//! Support chat models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mobigear_core::{ChatMessageId, ChatRoomId, UserId};

/// A chat room between one customer and the support team.
#[derive(Debug, Clone)]
pub struct ChatRoom {
    pub id: ChatRoomId,
    pub user_id: UserId,
    pub username: String,
    pub admin_id: Option<UserId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted chat message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub room_id: ChatRoomId,
    pub sender_id: UserId,
    pub sender_username: String,
    pub sender_is_admin: bool,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// The wire format broadcast to every websocket subscriber of a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutgoingChatMessage {
    pub message: String,
    pub username: String,
    /// `HH:MM` wall-clock time of the message.
    pub timestamp: String,
    pub is_admin: bool,
}

impl OutgoingChatMessage {
    /// Build the broadcast payload for a freshly sent message.
    #[must_use]
    pub fn new(content: &str, username: &str, is_admin: bool, at: DateTime<Utc>) -> Self {
        Self {
            message: content.to_owned(),
            username: username.to_owned(),
            timestamp: at.format("%H:%M").to_string(),
            is_admin,
        }
    }
}

/// Frame sent by websocket clients.
#[derive(Debug, Deserialize)]
pub struct IncomingChatMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_outgoing_payload_shape() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 0).single().expect("valid time");
        let msg = OutgoingChatMessage::new("Shop còn hàng không?", "user1", false, at);
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["message"], "Shop còn hàng không?");
        assert_eq!(json["username"], "user1");
        assert_eq!(json["timestamp"], "09:05");
        assert_eq!(json["is_admin"], false);
        // Exactly the four fields the clients rely on
        assert_eq!(json.as_object().map(serde_json::Map::len), Some(4));
    }
}
