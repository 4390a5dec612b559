//! Adapter over the `shakmaty` rules engine.
//!
//! The room core treats move legality, notation, and game-end detection as
//! an opaque oracle; everything rule-shaped stays behind this type.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, EnPassantMode, Position};
use shared::Color;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("unparsable move text")]
    Unparsable,
    #[error("illegal move in the current position")]
    Illegal,
}

/// One chess game. Replaced, not reset, between matches.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pos: Chess,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a SAN move for the side to move and returns the engine's
    /// canonical notation (with check/mate suffix) for broadcasting.
    pub fn apply_san(&mut self, move_text: &str) -> Result<String, MoveError> {
        let san: SanPlus = move_text.parse().map_err(|_| MoveError::Unparsable)?;
        let mv = san.san.to_move(&self.pos).map_err(|_| MoveError::Illegal)?;
        let canonical = SanPlus::from_move(self.pos.clone(), &mv).to_string();
        self.pos = self.pos.clone().play(&mv).map_err(|_| MoveError::Illegal)?;
        Ok(canonical)
    }

    /// Current position as a portable FEN string.
    pub fn fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn turn(&self) -> Color {
        match self.pos.turn() {
            shakmaty::Color::White => Color::White,
            shakmaty::Color::Black => Color::Black,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.pos.is_game_over()
    }

    pub fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }
}
