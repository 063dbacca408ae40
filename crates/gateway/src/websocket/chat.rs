//! The live chat connection: one socket per client, authenticated once from
//! the handshake cookies.

use agora_auth::Identity;
use agora_chats::{ChatError, ClientEvent, ConnectionHandle, ServerEvent};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::middleware::cookie_header;
use crate::state::GatewayState;

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn chat_websocket_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<Arc<GatewayState>>,
) -> Response {
    let cookies = cookie_header(&headers);
    let identity = state.authenticator.authenticate(cookies.as_deref());

    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

async fn handle_socket(socket: WebSocket, state: Arc<GatewayState>, identity: Identity) {
    let (mut sink, mut stream) = socket.split();
    let (handle, mut outbound) = ConnectionHandle::channel(state.outbound_buffer);
    let connection_id = handle.id();

    let mut writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(error) => {
                    warn!(connection_id, %error, "failed to serialize server event");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                return;
            }
        }
        let _ = sink.close().await;
    });

    if let Identity::Authenticated(user_id) = &identity {
        state.presence().register(user_id.clone(), handle.clone()).await;
    }
    info!(
        connection_id,
        user_id = identity.user_id().unwrap_or("anonymous"),
        "connection opened"
    );

    let _ = handle.push(ServerEvent::Hello {
        user_id: identity.user_id().map(str::to_string),
        authenticated: identity.is_authenticated(),
    });

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(error) => {
                debug!(connection_id, %error, "socket read failed");
                break;
            }
        };

        let event = match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => event,
            Err(error) => {
                debug!(connection_id, %error, "unparseable client event");
                let _ = handle.push(ServerEvent::error("invalid_event", error.to_string()));
                continue;
            }
        };

        if let Err(error) = handle_client_event(event, &state, &identity, &handle).await {
            if matches!(error, ChatError::StoreUnavailable(_)) {
                warn!(connection_id, %error, "client event failed");
            } else {
                debug!(connection_id, %error, "client event rejected");
            }
            let _ = handle.push(ServerEvent::from(&error));
        }
    }

    if let Identity::Authenticated(user_id) = &identity {
        state.presence().unregister_connection(user_id, connection_id).await;
    }
    // The writer finishes once every handle is gone, after flushing what is queued.
    drop(handle);
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        debug!(connection_id, "outbound queue did not drain in time");
        writer.abort();
    }
    info!(connection_id, "connection closed");
}

/// Dispatches one client event. Errors are reported back on the same
/// connection and never close it.
pub async fn handle_client_event(
    event: ClientEvent,
    state: &GatewayState,
    identity: &Identity,
    handle: &ConnectionHandle,
) -> Result<(), ChatError> {
    match event {
        ClientEvent::NewMessage { text, partner_id } => {
            state
                .chats
                .send_message(identity.user_id(), &text, &partner_id, handle)
                .await?;
        }
        ClientEvent::Test(payload) => {
            if !identity.is_authenticated() {
                return Err(ChatError::Unauthenticated);
            }
            let reached = state.presence().broadcast_all(&ServerEvent::Test(payload)).await;
            debug!(reached, "test event broadcast");
        }
        ClientEvent::MarkRead { chat_id } => {
            let reader = identity.user_id().ok_or(ChatError::Unauthenticated)?;
            let updated = state.chats.read_state.mark_read(&chat_id, reader).await?;
            let _ = handle.push(ServerEvent::ChatRead { chat_id, updated });
        }
    }
    Ok(())
}
