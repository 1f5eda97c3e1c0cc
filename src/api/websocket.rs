//! WebSocket handler for the realtime dashboard stream
//!
//! Every connection gets its own broadcast receiver and forward task, so a
//! dead or slow client only ever costs itself: a failed write tears down
//! that connection, and a lagging receiver has old messages dropped by the
//! channel instead of blocking the senders.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::api::state::ApiState;
use crate::publisher::PushMessage;

/// WebSocket upgrade handler
///
/// GET /api/v1/stream
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle one dashboard connection
async fn handle_websocket(socket: WebSocket, state: ApiState) {
    info!("dashboard client connected");

    let (mut sender, mut receiver) = socket.split();

    // subscribe before the handshake so nothing published after the
    // handshake can be missed
    let mut push_rx = state.push_tx.subscribe();

    let mut send_task = tokio::spawn(async move {
        // initial handshake, then snapshots as they come
        if let Ok(text) = serde_json::to_string(&PushMessage::connected())
            && sender.send(Message::Text(text)).await.is_err()
        {
            debug!("handshake send failed, client disconnected");
            return;
        }

        loop {
            match push_rx.recv().await {
                Ok(message) => {
                    if let Ok(text) = serde_json::to_string(&message)
                        && sender.send(Message::Text(text)).await.is_err()
                    {
                        debug!("websocket send failed, client disconnected");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // snapshot model: missed messages are superseded anyway
                    warn!("slow dashboard client, skipped {skipped} messages");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("push channel closed");
                    break;
                }
            }
        }
    });

    // Inbound messages: only connection control is expected
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                Message::Ping(_) => {
                    // pong is sent automatically by axum
                }
                _ => {
                    // clients have nothing else to say on this channel
                }
            }
        }
    });

    // Whichever side finishes tears the other down
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    info!("dashboard client disconnected");
}
