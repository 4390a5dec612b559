use std::collections::HashMap;

use rand::Rng;
use shared::{Color, ServerMessage};

use crate::engine::Board;
use crate::room_manager::error::SessionError;
use crate::room_manager::session::Seat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Empty,
    AwaitingOpponent,
    Ready,
}

/// Active color assignment for the current match. At most one occupant per
/// color; rotates between matches while the admission slots stay fixed.
#[derive(Default)]
pub struct ColorSeats {
    white: Option<String>,
    black: Option<String>,
}

impl ColorSeats {
    pub fn occupant(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white.as_deref(),
            Color::Black => self.black.as_deref(),
            Color::Viewer => None,
        }
    }

    pub fn occupy(&mut self, color: Color, session_id: String) -> Result<(), SessionError> {
        let slot = match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
            Color::Viewer => return Err(SessionError::ColorTaken(color)),
        };
        if slot.is_some() {
            return Err(SessionError::ColorTaken(color));
        }
        *slot = Some(session_id);
        Ok(())
    }

    /// Frees whichever color the session holds, returning it.
    pub fn vacate_session(&mut self, session_id: &str) -> Option<Color> {
        if self.white.as_deref() == Some(session_id) {
            self.white = None;
            Some(Color::White)
        } else if self.black.as_deref() == Some(session_id) {
            self.black = None;
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn both_filled(&self) -> bool {
        self.white.is_some() && self.black.is_some()
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.white, &mut self.black);
    }
}

// short human-shareable code
fn random_room_id() -> String {
    format!("CHESS-{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

fn random_player_color() -> Color {
    if rand::thread_rng().gen_bool(0.5) {
        Color::White
    } else {
        Color::Black
    }
}

/// One match sequence between two seated players plus any observers.
pub struct Room {
    pub room_id: String,
    pub state: RoomState,
    pub num_matches: u32,
    pub matches_played: u32,
    /// Admission slots, assigned once at join time and never reassigned.
    pub host: Option<String>,
    pub guest: Option<String>,
    pub colors: ColorSeats,
    /// Seat whose color matches the engine's side to move; `None` whenever
    /// the room is not mid-match.
    pub next_to_move: Option<String>,
    pub board: Board,
    seats: HashMap<String, Seat>,
}

impl Room {
    pub fn new(num_matches: u32) -> Self {
        Self {
            room_id: random_room_id(),
            state: RoomState::Empty,
            num_matches,
            matches_played: 0,
            host: None,
            guest: None,
            colors: ColorSeats::default(),
            next_to_move: None,
            board: Board::new(),
            seats: HashMap::new(),
        }
    }

    pub fn seat(&self, session_id: &str) -> Option<&Seat> {
        self.seats.get(session_id)
    }

    pub fn seat_mut(&mut self, session_id: &str) -> Option<&mut Seat> {
        self.seats.get_mut(session_id)
    }

    pub fn admit(&mut self, seat: Seat) {
        self.seats.insert(seat.session_id.clone(), seat);
    }

    pub fn set_host(&mut self, session_id: String) {
        self.host = Some(session_id);
    }

    pub fn set_guest(&mut self, session_id: String) {
        self.guest = Some(session_id);
    }

    pub fn host_seat(&self) -> Option<&Seat> {
        self.host.as_deref().and_then(|sid| self.seats.get(sid))
    }

    pub fn guest_seat(&self) -> Option<&Seat> {
        self.guest.as_deref().and_then(|sid| self.seats.get(sid))
    }

    /// Both admission slots taken. Gates joining, not match start.
    pub fn is_full(&self) -> bool {
        self.host.is_some() && self.guest.is_some()
    }

    /// Both colors occupied. Gates match start: admission and color seating
    /// are decoupled, and a departed player frees a color slot without
    /// freeing an admission slot.
    pub fn board_is_full(&self) -> bool {
        self.colors.both_filled()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Color for the next admitted player: the complement of the color
    /// already taken, otherwise a coin flip.
    pub fn available_color(&self) -> Color {
        let taken = self
            .host_seat()
            .map(|seat| seat.color)
            .filter(|color| color.is_player())
            .or_else(|| {
                self.guest_seat()
                    .map(|seat| seat.color)
                    .filter(|color| color.is_player())
            });
        match taken {
            Some(color) => color.opposite(),
            None => random_player_color(),
        }
    }

    /// Validates turn order and seat identity, then delegates to the engine.
    /// Returns the canonical notation of the applied move.
    pub fn make_move(&mut self, player_id: &str, move_text: &str) -> Result<String, SessionError> {
        if self.state != RoomState::Ready || !self.board_is_full() {
            return Err(SessionError::RoomNotReady(self.room_id.clone()));
        }
        let on_turn = self
            .next_to_move
            .as_deref()
            .and_then(|sid| self.seats.get(sid))
            .ok_or(SessionError::OutOfTurn)?;
        if on_turn.player_id.as_deref() != Some(player_id) {
            return Err(SessionError::OutOfTurn);
        }
        let applied = self.board.apply_san(move_text)?;
        self.next_to_move = self.colors.occupant(self.board.turn()).map(str::to_string);
        Ok(applied)
    }

    /// Public identity of whoever moves next.
    pub fn next_user_id(&self) -> Option<String> {
        self.next_to_move
            .as_deref()
            .and_then(|sid| self.seats.get(sid))
            .map(|seat| seat.user_id.clone())
    }

    pub fn user_id_of(&self, color: Color) -> Option<String> {
        self.colors
            .occupant(color)
            .and_then(|sid| self.seats.get(sid))
            .map(|seat| seat.user_id.clone())
    }

    /// Removes a seat from the participant table, freeing its color slot
    /// and the turn pointer if it held them.
    pub fn remove_seat(&mut self, session_id: &str) -> Option<Seat> {
        let seat = self.seats.remove(session_id)?;
        self.colors.vacate_session(session_id);
        if self.next_to_move.as_deref() == Some(session_id) {
            self.next_to_move = None;
        }
        Some(seat)
    }

    /// Inverts the color assignment for the next match: the two seated
    /// players trade colors and the slots swap with them.
    pub fn rotate_colors(&mut self) {
        for color in [Color::White, Color::Black] {
            if let Some(sid) = self.colors.occupant(color).map(str::to_string) {
                if let Some(seat) = self.seats.get_mut(&sid) {
                    seat.color = seat.color.opposite();
                }
            }
        }
        self.colors.swap();
    }

    /// Best-effort delivery to every live participant, observers included.
    pub fn broadcast_to_all(&self, message: &ServerMessage) {
        for seat in self.seats.values() {
            if !seat.is_active {
                continue;
            }
            if seat.tx.send(message.clone()).is_err() {
                tracing::debug!(room_id = %self.room_id, user_id = %seat.user_id, "skipping closed recipient");
            }
        }
    }

    /// Best-effort delivery to the admission seats only.
    pub fn broadcast_to_players(&self, message: &ServerMessage) {
        for seat in [self.host_seat(), self.guest_seat()].into_iter().flatten() {
            if !seat.is_active {
                continue;
            }
            if seat.tx.send(message.clone()).is_err() {
                tracing::debug!(room_id = %self.room_id, user_id = %seat.user_id, "skipping closed recipient");
            }
        }
    }
}
