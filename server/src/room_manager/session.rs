use shared::{Color, ServerMessage};
use tokio::sync::mpsc;

pub type Tx = mpsc::UnboundedSender<ServerMessage>;

/// Connection-scoped identity for the socket loop. `session_id` is replaced
/// when the connection successfully reclaims an earlier seat.
pub struct Connection {
    pub session_id: String,
    pub user_id: String,
    pub tx: Tx,
}

impl Connection {
    pub fn send(&self, message: ServerMessage) {
        if self.tx.send(message).is_err() {
            tracing::debug!(session_id = %self.session_id, "dropping reply to closed connection");
        }
    }
}

/// One participant in a room: a player holding a color, or an observer.
///
/// `player_id` is issued once, when the participant is seated on a color,
/// and never changes; `session_id` is replaced on reconnect but keeps
/// identifying the same logical participant through `player_id`.
pub struct Seat {
    pub tx: Tx,
    pub session_id: String,
    pub player_id: Option<String>,
    pub user_id: String,
    pub color: Color,
    pub wins: u32,
    pub ties: u32,
    pub is_active: bool,
}

impl Seat {
    pub fn new(conn: &Connection, color: Color) -> Self {
        Self {
            tx: conn.tx.clone(),
            session_id: conn.session_id.clone(),
            player_id: None,
            user_id: conn.user_id.clone(),
            color,
            wins: 0,
            ties: 0,
            is_active: true,
        }
    }
}
