use rand::Rng;
use shared::ServerMessage;

use crate::room_manager::error::SessionError;
use crate::room_manager::room::RoomState;
use crate::room_manager::session::Connection;
use crate::room_manager::AppState;

impl AppState {
    /// Relays an in-room chat line to the seated players. Rooms that are
    /// not ready swallow chat silently.
    pub async fn handle_chat_message(
        &self,
        conn: &Connection,
        room_id: String,
        message: String,
    ) -> Result<(), SessionError> {
        let mut registry = self.registry.lock().await;
        let room = registry
            .lookup_strict(&conn.session_id, &room_id)
            .ok_or_else(|| SessionError::NotInRoom(room_id.clone()))?;
        if room.state != RoomState::Ready {
            return Ok(());
        }
        room.broadcast_to_players(&ServerMessage::ChatMessage {
            chat_id: rand::thread_rng().gen_range(0..1_000_000),
            user_id: conn.user_id.clone(),
            message,
        });
        Ok(())
    }
}
