use crate::game::constants::{GAME_OVER_GRACE_MS, MAX_PLAYERS_PER_ROOM, TICK_MS};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub rooms: RoomSettings,
}

#[derive(Debug, Clone, Copy)]
pub struct RoomSettings {
    pub tick_ms: u64,
    pub max_players: usize,
    pub game_over_grace_ms: u64,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            max_players: MAX_PLAYERS_PER_ROOM,
            game_over_grace_ms: GAME_OVER_GRACE_MS,
        }
    }
}

impl RoomSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn game_over_grace(&self) -> Duration {
        Duration::from_millis(self.game_over_grace_ms)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(8787),
            rooms: RoomSettings {
                tick_ms: env::var("TICK_MS")
                    .ok()
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(TICK_MS)
                    .clamp(10, 200),
                max_players: env::var("MAX_PLAYERS_PER_ROOM")
                    .ok()
                    .and_then(|value| value.parse::<usize>().ok())
                    .unwrap_or(MAX_PLAYERS_PER_ROOM)
                    .clamp(2, MAX_PLAYERS_PER_ROOM),
                game_over_grace_ms: env::var("GAME_OVER_GRACE_SECS")
                    .ok()
                    .and_then(|value| parse_grace_ms(&value))
                    .unwrap_or(GAME_OVER_GRACE_MS),
            },
        }
    }
}

fn parse_grace_ms(secs: &str) -> Option<u64> {
    secs.trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}
