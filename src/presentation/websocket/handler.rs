//! WebSocket Connection Handler
//!
//! One chat stream per connection: the room's state first, then every
//! accepted document of that room until either side closes.

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::ChatStreamMessage;
use crate::application::dto::RoomSnapshotResponse;
use crate::infrastructure::metrics::ChatStreamGuard;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// WebSocket upgrade handler
///
/// The slug is resolved before upgrading so unknown rooms get a plain 404.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let slug_info = state.rooms.resolve(&slug).await?;
    let read_only = !slug_info.can_write();
    let rpid = slug_info.rpid;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, rpid, read_only)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, rpid: String, read_only: bool) {
    let _guard = ChatStreamGuard::open();
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before reading the snapshot so no document falls in between
    let mut events = state.hub.subscribe(&rpid);
    let mut closing = state.hub.closing();

    let init = match state.rooms.snapshot(&rpid).await.and_then(|room| {
        ChatStreamMessage::init(&RoomSnapshotResponse::new(room, read_only))
            .map_err(|e| AppError::Internal(e.to_string()))
    }) {
        Ok(init) => init,
        Err(e) => {
            tracing::error!(rpid = %rpid, error = %e, "Failed to load room for chat stream");
            return;
        }
    };

    let shutting_down = *closing.borrow();
    if shutting_down || send_frame(&mut sender, &init).await.is_err() {
        return;
    }
    tracing::debug!(rpid = %rpid, read_only, "Chat stream opened");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(frame) => {
                    if send_frame(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(rpid = %rpid, skipped, "Chat stream lagging, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                // Clients only listen; pings are answered by axum
                Some(Ok(_)) => {}
            },
            _ = closing.changed() => {
                let _ = sender
                    .send(Message::Close(Some(CloseFrame {
                        code: axum::extract::ws::close_code::AWAY,
                        reason: "server shutting down".into(),
                    })))
                    .await;
                break;
            }
        }
    }

    tracing::debug!(rpid = %rpid, "Chat stream closed");
}

async fn send_frame<S>(sender: &mut S, frame: &ChatStreamMessage) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let text = match serde_json::to_string(frame) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to serialize chat frame: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(text.into())).await.map_err(|_| ())
}
