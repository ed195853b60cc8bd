use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::chat::{ChatRequest, ClientFrame, ServerEvent};
use crate::services::SessionHandler;

pub const CHAT_MESSAGE_EVENT: &str = "chat_message";

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(session_handler): State<Arc<SessionHandler>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, session_handler))
}

/// Each inbound event runs in its own task; replies go back through one
/// writer so a slow answer never holds up the rest of the connection.
async fn handle_socket(socket: WebSocket, session_handler: Arc<SessionHandler>) {
    let connection_id = Uuid::new_v4();
    let span = info_span!("ws", %connection_id);

    async move {
        info!("Client connected");

        let (mut sink, mut stream) = socket.split();
        let (tx, mut rx) = mpsc::channel::<ServerEvent>(32);

        let writer = tokio::spawn(
            async move {
                while let Some(event) = rx.recv().await {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to encode outbound event: {}", e);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        warn!("Client went away before reply was sent");
                        break;
                    }
                }
            }
            .in_current_span(),
        );

        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
            };

            let Some(request) = decode_frame(text.as_str()) else {
                continue;
            };

            let session_handler = session_handler.clone();
            let tx = tx.clone();
            tokio::spawn(
                async move {
                    let response = session_handler.handle(&request).await;
                    if tx.send(ServerEvent::ChatResponse(response)).await.is_err() {
                        warn!("Connection closed, dropping chat_response");
                    }
                }
                .in_current_span(),
            );
        }

        drop(tx);
        if let Err(e) = writer.await {
            error!("Writer task failed: {}", e);
        }
        info!("Client disconnected");
    }
    .instrument(span)
    .await
}

/// Map a text frame to a chat request.
///
/// Unknown events are ignored (`None`). Frames that are not JSON become an
/// empty request so the client still gets `Invalid message.`.
pub fn decode_frame(text: &str) -> Option<ChatRequest> {
    match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) if frame.event == CHAT_MESSAGE_EVENT => Some(ChatRequest::from_value(frame.data)),
        Ok(frame) => {
            warn!(event = %frame.event, "Ignoring unknown event");
            None
        }
        Err(e) => {
            warn!("Malformed frame: {}", e);
            Some(ChatRequest::default())
        }
    }
}
