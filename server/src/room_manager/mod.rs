use std::sync::Arc;
use std::time::Duration;

use shared::ClientMessage;
use tokio::sync::Mutex;

pub mod chat;
pub mod error;
pub mod joining;
pub mod lifecycle;
pub mod move_handler;
pub mod registry;
pub mod room;
pub mod session;

pub use error::SessionError;
pub use session::{Connection, Seat, Tx};

use registry::Registry;

/// Window a disconnected seat may be reclaimed before eviction.
pub const GRACE_PERIOD: Duration = Duration::from_secs(120);
/// Pause between matches so clients can render the end-of-match event.
pub const MATCH_RESTART_DELAY: Duration = Duration::from_secs(5);

pub struct AppState {
    /// All room and session state. One handler runs to completion under this
    /// lock before the next event for any connection is processed; deferred
    /// timers re-acquire it and re-validate at fire time.
    pub registry: Arc<Mutex<Registry>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::new())),
        }
    }

    pub async fn dispatch(
        &self,
        conn: &mut Connection,
        message: ClientMessage,
    ) -> Result<(), SessionError> {
        match message {
            ClientMessage::CreateRoom { color, num_matches } => {
                self.handle_create_room(conn, color, num_matches).await
            }
            ClientMessage::JoinRoom {
                room_id,
                is_viewer,
                reconnect,
                session_id,
            } => {
                self.handle_join_room(conn, room_id, is_viewer, reconnect, session_id)
                    .await
            }
            ClientMessage::AddToRoom { room_id } => self.handle_add_to_room(conn, room_id).await,
            ClientMessage::MakeMove {
                room_id,
                player_id,
                move_text,
            } => {
                self.handle_make_move(conn, room_id, player_id, move_text)
                    .await
            }
            ClientMessage::LeaveRoom { room_id } => self.handle_leave_room(conn, room_id).await,
            ClientMessage::ChatMessage { room_id, message } => {
                self.handle_chat_message(conn, room_id, message).await
            }
            ClientMessage::HeartBeat => Ok(()),
        }
    }
}
