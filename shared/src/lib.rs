use serde::{Deserialize, Serialize};

/// Seat color on the wire: `"w"`, `"b"`, or `"v"` for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
    #[serde(rename = "v")]
    Viewer,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
            Color::Viewer => Color::Viewer,
        }
    }

    pub fn is_player(self) -> bool {
        matches!(self, Color::White | Color::Black)
    }
}

/// Win/tie totals for one seated player, reported to joining observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStanding {
    pub user_id: String,
    pub wins: u32,
    pub ties: u32,
}

/// Every inbound message is `{type, payload}` JSON. Required-field
/// validation happens here, once; handlers receive typed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    CreateRoom {
        #[serde(default)]
        color: Option<Color>,
        #[serde(default)]
        num_matches: Option<u32>,
    },
    JoinRoom {
        room_id: String,
        #[serde(default)]
        is_viewer: bool,
        #[serde(default)]
        reconnect: bool,
        #[serde(default)]
        session_id: Option<String>,
    },
    AddToRoom {
        room_id: String,
    },
    MakeMove {
        room_id: String,
        player_id: String,
        #[serde(rename = "move")]
        move_text: String,
    },
    LeaveRoom {
        room_id: String,
    },
    ChatMessage {
        room_id: String,
        message: String,
    },
    HeartBeat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    RoomInfo {
        session_id: String,
        user_id: String,
        room_id: String,
        is_player: bool,
        is_viewer: bool,
    },
    PlayerInfo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
        color: Color,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fen: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        match_id: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        standings: Option<Vec<PlayerStanding>>,
    },
    RoomReady,
    StartGame {
        match_id: u32,
        fen: String,
        next: Option<String>,
    },
    GameMove {
        #[serde(rename = "move")]
        move_text: String,
        next: Option<String>,
    },
    EndGame {
        winner: Option<String>,
        winner_color: Option<Color>,
        completed: bool,
    },
    PlayerDisconnected {
        user_id: String,
        color: Color,
    },
    PlayerLeft {
        user_id: String,
        color: Color,
    },
    BoardIsFull,
    PlayerInRoom,
    ChatMessage {
        chat_id: u32,
        user_id: String,
        message: String,
    },
}
