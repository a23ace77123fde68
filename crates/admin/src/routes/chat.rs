//! Agent chat console: room list, room view, and the agent websocket.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::ChatRoomId;

use crate::chat::{IncomingChatMessage, OutgoingChatMessage};
use crate::db::chat::{ChatRepository, RoomSummary};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::routes::context::AdminContext;
use crate::state::AppState;

/// Messages shown when opening a room.
const HISTORY_LIMIT: i64 = 100;

/// Chat message display data.
#[derive(Debug, Clone)]
pub struct ChatMessageView {
    pub username: String,
    pub content: String,
    pub is_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Room list template.
#[derive(Template, WebTemplate)]
#[template(path = "chat/index.html")]
pub struct ChatListTemplate {
    pub ctx: AdminContext,
    pub rooms: Vec<RoomSummary>,
}

/// Room view template.
#[derive(Template, WebTemplate)]
#[template(path = "chat/room.html")]
pub struct ChatRoomTemplate {
    pub ctx: AdminContext,
    pub room_id: i32,
    pub customer: String,
    pub messages: Vec<ChatMessageView>,
}

/// Active rooms, most recently updated first.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<ChatListTemplate> {
    let rooms = ChatRepository::new(state.pool()).list_active_rooms().await?;
    let ctx = AdminContext::build(&session, &admin, "/chat").await;

    Ok(ChatListTemplate { ctx, rooms })
}

/// One room with its recent history. Opening marks the customer's messages
/// read and claims the room for this agent.
#[instrument(skip(state, session, admin))]
pub async fn room(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(room_id): Path<i32>,
) -> Result<ChatRoomTemplate> {
    let repo = ChatRepository::new(state.pool());
    let room_id = ChatRoomId::new(room_id);

    let customer = repo
        .room_customer(room_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("chat room {room_id}")))?;

    repo.open_room(room_id, admin.id).await?;
    let messages = repo.recent_messages(room_id, HISTORY_LIMIT).await?;

    let ctx = AdminContext::build(&session, &admin, "/chat").await;

    Ok(ChatRoomTemplate {
        ctx,
        room_id: room_id.as_i32(),
        customer,
        messages: messages
            .iter()
            .map(|m| ChatMessageView {
                username: m.sender_username.clone(),
                content: m.content.clone(),
                is_admin: m.sender_is_admin(),
                created_at: m.created_at,
            })
            .collect(),
    })
}

/// Upgrade to the agent websocket for a room.
#[instrument(skip(state, ws, admin))]
pub async fn websocket(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(room_id): Path<i32>,
    ws: WebSocketUpgrade,
) -> Result<Response> {
    let room_id = ChatRoomId::new(room_id);

    let exists = ChatRepository::new(state.pool())
        .room_customer(room_id)
        .await?
        .is_some();
    if !exists {
        return Err(AppError::NotFound(format!("chat room {room_id}")));
    }

    Ok(ws.on_upgrade(move |socket| run_socket(state, admin, room_id, socket)))
}

/// Pump messages between the agent's websocket and the room hub.
async fn run_socket(
    state: AppState,
    admin: CurrentAdmin,
    room_id: ChatRoomId,
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
                        match repo.add_message(room_id, admin.id, content).await {
                            Ok(created_at) => {
                                let outgoing = OutgoingChatMessage::new(
                                    content,
                                    &admin.username,
                                    true,
                                    created_at,
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
