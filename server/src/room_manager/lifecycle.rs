use std::sync::Arc;

use shared::ServerMessage;
use tokio::sync::Mutex;

use crate::room_manager::error::SessionError;
use crate::room_manager::registry::Registry;
use crate::room_manager::session::Connection;
use crate::room_manager::{AppState, GRACE_PERIOD};

impl AppState {
    /// Transport close: mark the seat inactive, tell the room, and leave a
    /// grace window during which the same participant may reclaim it.
    pub async fn handle_disconnect(&self, conn: &Connection) {
        let mut registry = self.registry.lock().await;
        let Some(room) = registry.lookup(&conn.session_id) else {
            return;
        };
        let Some(seat) = room.seat_mut(&conn.session_id) else {
            return;
        };
        seat.is_active = false;
        let user_id = seat.user_id.clone();
        let color = seat.color;
        tracing::info!(room_id = %room.room_id, user_id = %user_id, "participant disconnected, grace timer started");
        room.broadcast_to_all(&ServerMessage::PlayerDisconnected { user_id, color });
        drop(registry);

        let registry = Arc::clone(&self.registry);
        let session_id = conn.session_id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(GRACE_PERIOD).await;
            Self::evict_if_still_inactive(&registry, &session_id).await;
        });
    }

    /// Grace-timer continuation. A seat that went active again in the
    /// interim makes this a stale no-op; the timer is never cancelled.
    async fn evict_if_still_inactive(registry: &Mutex<Registry>, session_id: &str) {
        let mut registry = registry.lock().await;
        let Some(room_id) = registry.room_id_for(session_id).map(str::to_string) else {
            return;
        };
        let still_inactive = registry
            .room_by_id(&room_id)
            .and_then(|room| room.seat(session_id))
            .is_some_and(|seat| !seat.is_active);
        if !still_inactive {
            return;
        }
        let mut room_now_empty = false;
        if let Some(room) = registry.room_by_id_mut(&room_id) {
            if let Some(seat) = room.remove_seat(session_id) {
                tracing::info!(room_id = %room_id, user_id = %seat.user_id, "grace period expired, seat evicted");
                room.broadcast_to_all(&ServerMessage::PlayerLeft {
                    user_id: seat.user_id,
                    color: seat.color,
                });
            }
            room_now_empty = room.is_empty();
        }
        registry.unbind(session_id);
        if room_now_empty {
            tracing::info!(room_id = %room_id, "room empty, destroying");
            registry.remove_room(&room_id);
        }
    }

    /// Voluntary departure: no grace period, the seat goes immediately.
    pub async fn handle_leave_room(
        &self,
        conn: &Connection,
        room_id: String,
    ) -> Result<(), SessionError> {
        let mut registry = self.registry.lock().await;
        let room_now_empty;
        {
            let room = registry
                .lookup_strict(&conn.session_id, &room_id)
                .ok_or_else(|| SessionError::NotInRoom(room_id.clone()))?;
            if let Some(seat) = room.remove_seat(&conn.session_id) {
                tracing::info!(room_id = %room_id, user_id = %seat.user_id, "participant left");
                room.broadcast_to_all(&ServerMessage::PlayerLeft {
                    user_id: seat.user_id,
                    color: seat.color,
                });
            }
            room_now_empty = room.is_empty();
        }
        registry.unbind(&conn.session_id);
        if room_now_empty {
            tracing::info!(room_id = %room_id, "room empty, destroying");
            registry.remove_room(&room_id);
        }
        Ok(())
    }
}
