use crate::game::types::{Direction, GameSnapshot, PlayerSummary, RoomEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    CreateRoom {
        name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        name: Option<String>,
    },
    ListRooms,
    StartGame,
    SetDirection {
        direction: Direction,
    },
    Shoot,
    Dash,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomListing {
    pub id: String,
    pub players: usize,
    #[serde(rename = "maxPlayers")]
    pub max_players: usize,
    #[serde(rename = "inProgress")]
    pub in_progress: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: String, player_id: String },
    #[serde(rename_all = "camelCase")]
    JoinResult {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        players: Option<Vec<PlayerSummary>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    RoomList { rooms: Vec<RoomListing> },
    PlayerJoined { id: String, name: String },
    PlayerLeft { id: String },
    GameStarted,
    GameUpdate(GameSnapshot),
    #[serde(rename_all = "camelCase")]
    PlayerDied { player_id: String },
    #[serde(rename_all = "camelCase")]
    PlayerHit { player_id: String },
    #[serde(rename_all = "camelCase")]
    GunCollected { player_id: String },
    #[serde(rename_all = "camelCase")]
    DashCollected { player_id: String },
    #[serde(rename_all = "camelCase")]
    DashEnded { player_id: String },
    GameOver { winner: Option<String> },
    ZoneUpdate { radius: f64, shrinking: bool },
    ShrinkTimer { seconds: i64 },
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(payload) => Some(payload),
            Err(error) => {
                tracing::error!(?error, "failed to encode server message");
                None
            }
        }
    }
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::PlayerDied { player_id } => ServerMessage::PlayerDied { player_id },
            RoomEvent::PlayerHit { player_id } => ServerMessage::PlayerHit { player_id },
            RoomEvent::GunCollected { player_id } => ServerMessage::GunCollected { player_id },
            RoomEvent::DashCollected { player_id } => ServerMessage::DashCollected { player_id },
            RoomEvent::DashEnded { player_id } => ServerMessage::DashEnded { player_id },
            RoomEvent::GameOver { winner } => ServerMessage::GameOver { winner },
            RoomEvent::ZoneUpdate { radius, shrinking } => {
                ServerMessage::ZoneUpdate { radius, shrinking }
            }
            RoomEvent::ShrinkTimer { seconds } => ServerMessage::ShrinkTimer { seconds },
        }
    }
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
    serde_json::from_str(text).ok()
}
