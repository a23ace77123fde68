//! The storefront and admin processes exchange chat messages through
//! Postgres notifications; both sides define the wire types independently,
//! so these tests pin the JSON each produces to the shared shape:
//! `{message, username, timestamp, is_admin}` plus the routing `room_id`.

use chrono::TimeZone;
use chrono::Utc;

#[test]
fn test_storefront_payload_shape() {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).single().expect("valid time");
    let message =
        mobigear_storefront::models::OutgoingChatMessage::new("Đơn của mình tới đâu rồi?", "user2", false, at);

    let json = serde_json::to_value(&message).expect("serialize");
    assert_eq!(json["message"], "Đơn của mình tới đâu rồi?");
    assert_eq!(json["username"], "user2");
    assert_eq!(json["timestamp"], "14:30");
    assert_eq!(json["is_admin"], false);
}

#[test]
fn test_admin_payload_shape() {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 14, 31, 0).single().expect("valid time");
    let message = mobigear_admin::chat::OutgoingChatMessage::new(
        "Đơn đang được giao bạn nhé.",
        "admin",
        true,
        at,
    );

    let json = serde_json::to_value(&message).expect("serialize");
    assert_eq!(json["message"], "Đơn đang được giao bạn nhé.");
    assert_eq!(json["username"], "admin");
    assert_eq!(json["timestamp"], "14:31");
    assert_eq!(json["is_admin"], true);
}

#[test]
fn test_envelopes_are_cross_compatible() {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).single().expect("valid time");

    // A storefront-published envelope must parse on the admin side
    let storefront_envelope = mobigear_storefront::chat::ChatEnvelope {
        room_id: 12,
        message: mobigear_storefront::models::OutgoingChatMessage::new("hi", "user1", false, at),
    };
    let wire = serde_json::to_string(&storefront_envelope).expect("serialize");

    let admin_side: mobigear_admin::chat::ChatEnvelope =
        serde_json::from_str(&wire).expect("admin can parse storefront envelope");
    assert_eq!(admin_side.room_id, 12);
    assert_eq!(admin_side.message.username, "user1");
    assert!(!admin_side.message.is_admin);

    // And the other direction
    let admin_envelope = mobigear_admin::chat::ChatEnvelope {
        room_id: 12,
        message: mobigear_admin::chat::OutgoingChatMessage::new("hello", "admin", true, at),
    };
    let wire = serde_json::to_string(&admin_envelope).expect("serialize");

    let storefront_side: mobigear_storefront::chat::ChatEnvelope =
        serde_json::from_str(&wire).expect("storefront can parse admin envelope");
    assert_eq!(storefront_side.message.timestamp, "09:00");
    assert!(storefront_side.message.is_admin);
}
