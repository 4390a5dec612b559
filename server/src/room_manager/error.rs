use thiserror::Error;

use crate::engine::MoveError;

/// Protocol violations that close the offending connection. Nothing here is
/// broadcast, and the failing handler leaves room state untouched.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown room {0}")]
    UnknownRoom(String),
    #[error("session is not bound to room {0}")]
    NotInRoom(String),
    #[error("room {0} is not ready")]
    RoomNotReady(String),
    #[error("move submitted out of turn")]
    OutOfTurn,
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error("reconnect rejected")]
    ReconnectRejected,
    #[error("seat already holds a player id")]
    AlreadySeated,
    #[error("color {0:?} is already occupied")]
    ColorTaken(shared::Color),
}
