use rand::Rng;
use shared::{Color, PlayerStanding, ServerMessage};
use uuid::Uuid;

use crate::engine::Board;
use crate::room_manager::error::SessionError;
use crate::room_manager::room::{Room, RoomState};
use crate::room_manager::session::{Connection, Seat};
use crate::room_manager::AppState;

impl AppState {
    /// Creates a room and seats the caller as host with their chosen color.
    pub async fn handle_create_room(
        &self,
        conn: &Connection,
        color: Option<Color>,
        num_matches: Option<u32>,
    ) -> Result<(), SessionError> {
        let color = match color {
            Some(color) if color.is_player() => color,
            _ => {
                if rand::thread_rng().gen_bool(0.5) {
                    Color::White
                } else {
                    Color::Black
                }
            }
        };
        // anything outside the offered ladder falls back silently
        let num_matches = match num_matches {
            Some(n @ (1 | 3 | 5)) => n,
            _ => 3,
        };

        let mut registry = self.registry.lock().await;
        let mut room = Room::new(num_matches);
        while registry.contains_room(&room.room_id) {
            room = Room::new(num_matches);
        }
        tracing::info!(room_id = %room.room_id, user_id = %conn.user_id, matches = num_matches, "room created");

        conn.send(ServerMessage::RoomInfo {
            session_id: conn.session_id.clone(),
            user_id: conn.user_id.clone(),
            room_id: room.room_id.clone(),
            is_player: true,
            is_viewer: false,
        });

        room.admit(Seat::new(conn, color));
        room.set_host(conn.session_id.clone());
        room.state = RoomState::AwaitingOpponent;
        registry.bind(conn.session_id.clone(), room.room_id.clone());
        registry.insert_room(room);
        Ok(())
    }

    /// Admits a participant into an existing room: as the guest player while
    /// that slot is open, as an observer when asked, or back onto an
    /// inactive seat when reconnecting.
    pub async fn handle_join_room(
        &self,
        conn: &mut Connection,
        room_id: String,
        is_viewer: bool,
        reconnect: bool,
        prior_session: Option<String>,
    ) -> Result<(), SessionError> {
        if reconnect {
            return self.handle_reconnect(conn, room_id, prior_session).await;
        }

        let mut registry = self.registry.lock().await;
        let room = registry
            .room_by_id_mut(&room_id)
            .ok_or_else(|| SessionError::UnknownRoom(room_id.clone()))?;

        // host or guest re-joining over the same connection
        let sid = conn.session_id.as_str();
        if room.host.as_deref() == Some(sid) || room.guest.as_deref() == Some(sid) {
            conn.send(ServerMessage::PlayerInRoom);
            return Ok(());
        }

        if !room.is_full() {
            let color = room.available_color();
            conn.send(ServerMessage::RoomInfo {
                session_id: conn.session_id.clone(),
                user_id: conn.user_id.clone(),
                room_id: room.room_id.clone(),
                is_player: true,
                is_viewer: false,
            });
            room.admit(Seat::new(conn, color));
            room.set_guest(conn.session_id.clone());
            room.state = RoomState::Ready;
            tracing::info!(room_id = %room.room_id, user_id = %conn.user_id, "guest joined, room ready");
            room.broadcast_to_players(&ServerMessage::RoomReady);
            registry.bind(conn.session_id.clone(), room_id);
            return Ok(());
        }

        if !is_viewer {
            conn.send(ServerMessage::BoardIsFull);
            return Ok(());
        }

        conn.send(ServerMessage::RoomInfo {
            session_id: conn.session_id.clone(),
            user_id: conn.user_id.clone(),
            room_id: room.room_id.clone(),
            is_player: false,
            is_viewer: true,
        });
        room.admit(Seat::new(conn, Color::Viewer));
        tracing::info!(room_id = %room_id, user_id = %conn.user_id, "observer joined");
        registry.bind(conn.session_id.clone(), room_id);
        Ok(())
    }

    /// Reclaims an inactive seat for a returning participant. The claimed
    /// room must match the prior session's binding and the seat must still
    /// be inactive: an active seat cannot be hijacked, and a second
    /// reconnect attempt is rejected, not duplicated.
    async fn handle_reconnect(
        &self,
        conn: &mut Connection,
        room_id: String,
        prior_session: Option<String>,
    ) -> Result<(), SessionError> {
        let prior = prior_session.ok_or(SessionError::ReconnectRejected)?;
        let mut registry = self.registry.lock().await;
        let room = registry
            .lookup_strict(&prior, &room_id)
            .ok_or(SessionError::ReconnectRejected)?;
        let seat = room.seat_mut(&prior).ok_or(SessionError::ReconnectRejected)?;
        if seat.is_active {
            return Err(SessionError::ReconnectRejected);
        }

        seat.tx = conn.tx.clone();
        seat.is_active = true;
        conn.session_id = prior.clone();
        conn.user_id = seat.user_id.clone();
        let player_id = seat.player_id.clone();
        let color = seat.color;
        tracing::info!(room_id = %room_id, user_id = %conn.user_id, "seat reclaimed");

        conn.send(ServerMessage::RoomInfo {
            session_id: prior,
            user_id: conn.user_id.clone(),
            room_id: room_id.clone(),
            is_player: color.is_player(),
            is_viewer: !color.is_player(),
        });
        conn.send(ServerMessage::PlayerInfo {
            player_id,
            color,
            fen: None,
            match_id: None,
            standings: None,
        });
        if room.board_is_full() {
            conn.send(ServerMessage::RoomReady);
        }
        // mid-match: replay the current position and whose turn it is
        if room.state == RoomState::Ready {
            conn.send(ServerMessage::StartGame {
                match_id: room.matches_played + 1,
                fen: room.board.fen(),
                next: room.next_user_id(),
            });
        }
        Ok(())
    }

    /// Seats an admitted participant on their color, issuing the per-seat
    /// player id, or replays room context to an observer. When the second
    /// color fills, the match opens.
    pub async fn handle_add_to_room(
        &self,
        conn: &Connection,
        room_id: String,
    ) -> Result<(), SessionError> {
        let mut registry = self.registry.lock().await;
        let room = registry
            .lookup_strict(&conn.session_id, &room_id)
            .ok_or_else(|| SessionError::NotInRoom(room_id.clone()))?;
        let seat = room
            .seat(&conn.session_id)
            .ok_or_else(|| SessionError::NotInRoom(room_id.clone()))?;

        match seat.color {
            color @ (Color::White | Color::Black) => {
                if seat.player_id.is_some() {
                    return Err(SessionError::AlreadySeated);
                }
                room.colors.occupy(color, conn.session_id.clone())?;
                let player_id = Uuid::new_v4().to_string();
                if let Some(seat) = room.seat_mut(&conn.session_id) {
                    seat.player_id = Some(player_id.clone());
                }
                conn.send(ServerMessage::PlayerInfo {
                    player_id: Some(player_id),
                    color,
                    fen: None,
                    match_id: None,
                    standings: None,
                });
            }
            Color::Viewer => {
                let standings: Vec<PlayerStanding> = [room.host_seat(), room.guest_seat()]
                    .into_iter()
                    .flatten()
                    .map(|seat| PlayerStanding {
                        user_id: seat.user_id.clone(),
                        wins: seat.wins,
                        ties: seat.ties,
                    })
                    .collect();
                conn.send(ServerMessage::PlayerInfo {
                    player_id: None,
                    color: Color::Viewer,
                    fen: Some(room.board.fen()),
                    match_id: Some(room.matches_played),
                    standings: Some(standings),
                });
            }
        }

        // both colors seated: reset the engine and open the match
        if room.board_is_full() {
            room.board = Board::new();
            room.next_to_move = room.colors.occupant(Color::White).map(str::to_string);
            tracing::info!(room_id = %room.room_id, "both colors seated, starting match");
            room.broadcast_to_players(&ServerMessage::StartGame {
                match_id: room.matches_played + 1,
                fen: room.board.fen(),
                next: room.next_user_id(),
            });
        }
        Ok(())
    }
}
