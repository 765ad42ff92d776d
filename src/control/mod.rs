use crate::app::config::{RoomSettings, ServerConfig};
use crate::app::room_code::{generate_room_code, is_valid_room_code, normalize_room_code};
use crate::app::time::now_millis;
use crate::game::room::{JoinAccepted, JoinError, OutboundSender, Room};
use crate::protocol::RoomListing;
use crate::room_runtime::spawn_room_loop;
use crate::transport::ws_session::handle_socket;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::Method,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Directory of live rooms keyed by their six-character code.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Room>>,
    settings: RoomSettings,
}

#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub room: Arc<Room>,
    pub player_id: String,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct RoomsResponse {
    rooms: Vec<RoomListing>,
}

pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let registry = Arc::new(RoomRegistry::new(config.rooms));
    let app = router(registry);

    let address = format!("0.0.0.0:{}", config.port);
    tracing::info!(
        tick_ms = config.rooms.tick_ms,
        max_players = config.rooms.max_players,
        "listening on {address}"
    );
    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(registry: Arc<RoomRegistry>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/rooms", get(list_rooms))
        .route("/api/ws", get(ws_handler))
        .layer(cors)
        .with_state(registry)
}

impl RoomRegistry {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            rooms: DashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    pub fn get(&self, code: &str) -> Option<Arc<Room>> {
        let code = normalize_room_code(code);
        if !is_valid_room_code(&code) {
            return None;
        }
        self.rooms.get(&code).map(|entry| Arc::clone(entry.value()))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Opens a room with the creator already seated as its owner. The room only
    /// becomes visible once the creator has joined.
    pub async fn create_room(
        &self,
        name: Option<String>,
        sender: OutboundSender,
    ) -> Result<CreatedRoom, JoinError> {
        loop {
            let code = self.fresh_code();
            let room = Arc::new(Room::new(code.clone(), self.settings.max_players, now_millis()));
            let accepted = room.join(name.clone(), sender.clone()).await?;
            match self.rooms.entry(code) {
                Entry::Vacant(entry) => {
                    entry.insert(Arc::clone(&room));
                }
                Entry::Occupied(entry) => {
                    tracing::warn!(room = %entry.key(), "room code collided, retrying");
                    continue;
                }
            }
            tracing::info!(
                room = %room.code(),
                player_id = %accepted.player_id,
                rooms = self.room_count(),
                "room created"
            );
            return Ok(CreatedRoom {
                room,
                player_id: accepted.player_id,
            });
        }
    }

    pub async fn join_room(
        &self,
        code: &str,
        name: Option<String>,
        sender: OutboundSender,
    ) -> Result<(Arc<Room>, JoinAccepted), JoinError> {
        let room = self.get(code).ok_or(JoinError::RoomNotFound)?;
        let accepted = room.join(name, sender).await?;
        Ok((room, accepted))
    }

    pub async fn list_rooms(&self) -> Vec<RoomListing> {
        let rooms: Vec<Arc<Room>> = self
            .rooms
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut listings = Vec::with_capacity(rooms.len());
        for room in rooms {
            listings.push(room.listing().await);
        }
        listings.sort_by(|a, b| a.id.cmp(&b.id));
        listings
    }

    /// Starts the game on behalf of `player_id` and hands the room to a ticker.
    pub async fn start_game(self: &Arc<Self>, room: &Arc<Room>, player_id: &str) -> bool {
        if !room.start(player_id, now_millis()).await {
            return false;
        }
        spawn_room_loop(Arc::clone(room), Arc::clone(self));
        true
    }

    pub async fn leave_room(&self, room: &Arc<Room>, player_id: &str) {
        if room.leave(player_id).await == 0 {
            self.remove_room(room);
        }
    }

    pub fn remove_room(&self, room: &Arc<Room>) {
        let removed = self
            .rooms
            .remove_if(room.code(), |_, current| Arc::ptr_eq(current, room))
            .is_some();
        if removed {
            tracing::info!(room = %room.code(), "room removed");
        }
    }

    fn fresh_code(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let code = generate_room_code(&mut rng);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn list_rooms(State(registry): State<Arc<RoomRegistry>>) -> impl IntoResponse {
    let rooms = registry.list_rooms().await;
    Json(RoomsResponse { rooms })
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<RoomRegistry>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}
