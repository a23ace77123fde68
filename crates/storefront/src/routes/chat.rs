//! Support chat page and websocket handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::chat::ChatRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::models::chat::{ChatMessage, IncomingChatMessage, OutgoingChatMessage};
use crate::routes::context::PageContext;
use crate::state::AppState;

/// Messages shown when opening the chat page.
const HISTORY_LIMIT: i64 = 50;

/// Chat message display data.
#[derive(Debug, Clone)]
pub struct ChatMessageView {
    pub username: String,
    pub content: String,
    pub is_admin: bool,
    pub is_mine: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ChatMessageView {
    fn from_message(message: &ChatMessage, viewer: &CurrentUser) -> Self {
        Self {
            username: message.sender_username.clone(),
            content: message.content.clone(),
            is_admin: message.sender_is_admin,
            is_mine: message.sender_id == viewer.id,
            created_at: message.created_at,
        }
    }
}

/// Chat room page template.
#[derive(Template, WebTemplate)]
#[template(path = "chat/room.html")]
pub struct ChatRoomTemplate {
    pub page: PageContext,
    pub room_id: i32,
    pub messages: Vec<ChatMessageView>,
}

/// Display the customer's chat room with its recent history.
#[instrument(skip(state, session, user))]
pub async fn room(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<ChatRoomTemplate> {
    let repo = ChatRepository::new(state.pool());
    let room = repo.get_or_create_for_user(user.id).await?;
    let messages = repo.recent_messages(room.id, HISTORY_LIMIT).await?;

    let views = messages
        .iter()
        .map(|m| ChatMessageView::from_message(m, &user))
        .collect();

    let page = PageContext::build(&state, &session, Some(user)).await;

    Ok(ChatRoomTemplate {
        page,
        room_id: room.id.as_i32(),
        messages: views,
    })
}

/// Upgrade to the chat websocket for the customer's room.
#[instrument(skip(state, ws, user))]
pub async fn websocket(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let room = ChatRepository::new(state.pool())
        .get_or_create_for_user(user.id)
        .await?;

    Ok(ws.on_upgrade(move |socket| run_socket(state, user, room.id, socket)))
}

/// Pump messages between one websocket client and the room hub.
///
/// Incoming frames are persisted and published through the hub (which also
/// reaches the admin process); hub broadcasts are pushed down the socket.
pub(crate) async fn run_socket(
    state: AppState,
    user: CurrentUser,
    room_id: mobigear_core::ChatRoomId,
    socket: WebSocket,
) {
    let mut updates = state.chat().subscribe(room_id);
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            broadcast = updates.recv() => {
                match broadcast {
                    Ok(outgoing) => {
                        let Ok(payload) = serde_json::to_string(&outgoing) else {
                            continue;
                        };
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(room = %room_id, "chat subscriber lagged by {skipped}");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(incoming) = serde_json::from_str::<IncomingChatMessage>(text.as_str()) else {
                            continue;
                        };
                        let content = incoming.message.trim();
                        if content.is_empty() {
                            continue;
                        }

                        let repo = ChatRepository::new(state.pool());
                        match repo.add_message(room_id, user.id, content).await {
                            Ok(stored) => {
                                let outgoing = OutgoingChatMessage::new(
                                    &stored.content,
                                    &stored.sender_username,
                                    stored.sender_is_admin,
                                    stored.created_at,
                                );
                                if let Err(e) = state.chat().publish(room_id, outgoing).await {
                                    tracing::error!(room = %room_id, "chat publish failed: {e}");
                                }
                            }
                            Err(e) => tracing::error!(room = %room_id, "chat persist failed: {e}"),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(room = %room_id, "chat socket error: {e}");
                        break;
                    }
                }
            }
        }
    }
}
