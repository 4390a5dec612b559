use crate::room_manager::{AppState, Connection};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use rand::Rng;
use shared::ClientMessage;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Forward room broadcasts onto the socket until either side closes
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&msg) else {
                continue;
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut conn = Connection {
        session_id: Uuid::new_v4().to_string(),
        // public display id, used in broadcasts and logs
        user_id: rand::thread_rng()
            .gen_range(1_000_000_000u64..10_000_000_000)
            .to_string(),
        tx,
    };
    tracing::info!(session_id = %conn.session_id, user_id = %conn.user_id, "connection opened");

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let parsed = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                // Fail fast: malformed payloads close the connection, no reply
                tracing::warn!(session_id = %conn.session_id, error = %err, "malformed message, closing");
                break;
            }
        };
        if let Err(err) = state.dispatch(&mut conn, parsed).await {
            tracing::warn!(session_id = %conn.session_id, error = %err, "rejected action, closing");
            break;
        }
    }

    tracing::info!(session_id = %conn.session_id, user_id = %conn.user_id, "connection closed");
    state.handle_disconnect(&conn).await;
}
