use std::sync::Arc;

use shared::{Color, ServerMessage};
use tokio::sync::Mutex;

use crate::engine::Board;
use crate::room_manager::error::SessionError;
use crate::room_manager::registry::Registry;
use crate::room_manager::room::RoomState;
use crate::room_manager::session::Connection;
use crate::room_manager::{AppState, MATCH_RESTART_DELAY};

impl AppState {
    /// Validates and applies one move, then drives match completion: winner
    /// bookkeeping, color rotation, and the deferred start of the next
    /// match.
    pub async fn handle_make_move(
        &self,
        conn: &Connection,
        room_id: String,
        player_id: String,
        move_text: String,
    ) -> Result<(), SessionError> {
        let mut registry = self.registry.lock().await;
        let room = registry
            .lookup_strict(&conn.session_id, &room_id)
            .ok_or_else(|| SessionError::NotInRoom(room_id.clone()))?;

        let applied = room.make_move(&player_id, &move_text)?;
        tracing::debug!(room_id = %room.room_id, user_id = %conn.user_id, san = %applied, "move applied");
        room.broadcast_to_all(&ServerMessage::GameMove {
            move_text: applied,
            next: room.next_user_id(),
        });

        if !room.board.is_game_over() {
            return Ok(());
        }

        // The side to move at checkmate is the loser; stalemates and other
        // terminal positions report no winner.
        let winner_color = room
            .board
            .is_checkmate()
            .then(|| room.board.turn().opposite());
        let winner = winner_color.and_then(|color| room.user_id_of(color));

        match winner_color {
            Some(color) => {
                if let Some(sid) = room.colors.occupant(color).map(str::to_string) {
                    if let Some(seat) = room.seat_mut(&sid) {
                        seat.wins += 1;
                    }
                }
            }
            None => {
                for color in [Color::White, Color::Black] {
                    if let Some(sid) = room.colors.occupant(color).map(str::to_string) {
                        if let Some(seat) = room.seat_mut(&sid) {
                            seat.ties += 1;
                        }
                    }
                }
            }
        }

        room.matches_played += 1;
        let completed = room.matches_played >= room.num_matches;
        tracing::info!(
            room_id = %room.room_id,
            winner = ?winner,
            matches_played = room.matches_played,
            completed,
            "match ended"
        );
        room.broadcast_to_all(&ServerMessage::EndGame {
            winner,
            winner_color,
            completed,
        });

        room.rotate_colors();
        room.state = RoomState::AwaitingOpponent;
        room.board = Board::new();
        room.next_to_move = None;

        if !completed {
            self.schedule_match_restart(room.room_id.clone(), room.matches_played);
        }
        Ok(())
    }

    /// Defers the next match long enough for clients to render the
    /// end-of-match event before the board resets.
    fn schedule_match_restart(&self, room_id: String, expected_played: u32) {
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            tokio::time::sleep(MATCH_RESTART_DELAY).await;
            Self::restart_match(&registry, &room_id, expected_played).await;
        });
    }

    /// Deferred continuation into the next match, re-validated at fire
    /// time: a stale task (room gone, seat evicted, counter advanced) is a
    /// no-op rather than being cancelled.
    async fn restart_match(registry: &Mutex<Registry>, room_id: &str, expected_played: u32) {
        let mut registry = registry.lock().await;
        let Some(room) = registry.room_by_id_mut(room_id) else {
            return;
        };
        if room.matches_played != expected_played
            || room.state != RoomState::AwaitingOpponent
            || !room.board_is_full()
        {
            return;
        }
        room.state = RoomState::Ready;
        room.next_to_move = room.colors.occupant(Color::White).map(str::to_string);
        tracing::info!(room_id = %room.room_id, match_id = room.matches_played + 1, "next match starting");
        room.broadcast_to_all(&ServerMessage::StartGame {
            match_id: room.matches_played + 1,
            fen: room.board.fen(),
            next: room.next_user_id(),
        });
    }
}
