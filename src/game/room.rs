use super::bullets::bullet_from;
use super::constants::{COLOR_POOL, MAX_SPAWN_ATTEMPTS};
use super::spawn::{fill_food, fill_powerups, spawn_snake_segments};
use super::types::{
    Bullet, Cell, Direction, Food, GameSnapshot, PlayerSummary, Powerup, RoomEvent, SafeZone,
    Snake,
};
use crate::protocol::{RoomListing, ServerMessage};
use crate::shared::names::sanitize_player_name;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

mod engine;
mod session;
#[cfg(test)]
mod tests;

pub use self::engine::TickOutcome;
pub use self::session::OutboundSender;
use self::session::SessionEntry;

#[derive(Debug)]
pub struct Room {
    code: String,
    state: Mutex<RoomState>,
    running: AtomicBool,
    ticker: StdMutex<Option<JoinHandle<()>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    RoomNotFound,
    AlreadyStarted,
    RoomFull,
}

impl JoinError {
    pub fn reason(self) -> &'static str {
        match self {
            Self::RoomNotFound => "room_not_found",
            Self::AlreadyStarted => "already_started",
            Self::RoomFull => "room_full",
        }
    }
}

#[derive(Debug, Clone)]
pub struct JoinAccepted {
    pub player_id: String,
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    Empty,
    Over,
}

#[derive(Debug)]
struct RoomState {
    code: String,
    max_players: usize,
    sessions: HashMap<String, SessionEntry>,
    snakes: Vec<Snake>,
    food: Vec<Food>,
    powerups: Vec<Powerup>,
    bullets: Vec<Bullet>,
    zone: SafeZone,
    started: bool,
    over: bool,
    winner: Option<String>,
    joined_total: usize,
    contenders: usize,
    move_accumulator: i64,
    last_advance_at: Option<i64>,
    last_shrink_seconds: Option<i64>,
    rng: StdRng,
}

impl Room {
    pub fn new(code: String, max_players: usize, now: i64) -> Self {
        Self {
            state: Mutex::new(RoomState::new(
                code.clone(),
                max_players,
                StdRng::from_entropy(),
                now,
            )),
            code,
            running: AtomicBool::new(false),
            ticker: StdMutex::new(None),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub async fn join(
        &self,
        name: Option<String>,
        sender: OutboundSender,
    ) -> Result<JoinAccepted, JoinError> {
        let mut state = self.state.lock().await;
        state.join(name, sender)
    }

    /// Removes the player and returns how many remain. An emptied room stops ticking at once.
    pub async fn leave(&self, player_id: &str) -> usize {
        let remaining = {
            let mut state = self.state.lock().await;
            state.remove_player(player_id);
            state.snakes.len()
        };
        if remaining == 0 {
            self.stop_ticker();
        }
        remaining
    }

    /// Returns true only for the call that actually started the game.
    pub async fn start(&self, player_id: &str, now: i64) -> bool {
        let mut state = self.state.lock().await;
        if !state.start_game(player_id, now) {
            return false;
        }
        state.broadcast(&ServerMessage::GameStarted, None);
        let snapshot = state.snapshot();
        state.broadcast(&ServerMessage::GameUpdate(snapshot), None);
        true
    }

    pub async fn set_direction(&self, player_id: &str, direction: Direction) -> bool {
        let mut state = self.state.lock().await;
        state.set_direction(player_id, direction)
    }

    pub async fn fire(&self, player_id: &str) -> bool {
        let mut state = self.state.lock().await;
        state.fire(player_id)
    }

    pub async fn activate_dash(&self, player_id: &str, now: i64) -> bool {
        let mut state = self.state.lock().await;
        state.activate_dash(player_id, now)
    }

    pub async fn listing(&self) -> RoomListing {
        let state = self.state.lock().await;
        state.listing()
    }

    /// One scheduler tick: advance the simulation and fan the outcome out to every session.
    pub async fn tick(&self, now: i64) -> TickStatus {
        let mut state = self.state.lock().await;
        if state.snakes.is_empty() {
            return TickStatus::Empty;
        }
        if let Some(outcome) = state.advance(now) {
            state.publish(outcome);
        }
        if state.over {
            TickStatus::Over
        } else {
            TickStatus::Running
        }
    }

    pub fn try_mark_running(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn mark_stopped(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn attach_ticker(&self, handle: JoinHandle<()>) {
        if let Ok(mut ticker) = self.ticker.lock() {
            if let Some(previous) = ticker.replace(handle) {
                previous.abort();
            }
        }
    }

    pub fn stop_ticker(&self) {
        let handle = self.ticker.lock().ok().and_then(|mut ticker| ticker.take());
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!(room = %self.code, "room ticker cancelled");
        }
        self.mark_stopped();
    }
}

impl RoomState {
    fn new(code: String, max_players: usize, mut rng: StdRng, now: i64) -> Self {
        let zone = SafeZone::new(now);
        let mut food = Vec::new();
        let mut powerups = Vec::new();
        fill_food(&mut rng, &mut food, &zone);
        fill_powerups(&mut rng, &mut powerups, &zone);
        Self {
            code,
            max_players,
            sessions: HashMap::new(),
            snakes: Vec::new(),
            food,
            powerups,
            bullets: Vec::new(),
            zone,
            started: false,
            over: false,
            winner: None,
            joined_total: 0,
            contenders: 0,
            move_accumulator: 0,
            last_advance_at: None,
            last_shrink_seconds: None,
            rng,
        }
    }

    fn join(
        &mut self,
        name: Option<String>,
        sender: OutboundSender,
    ) -> Result<JoinAccepted, JoinError> {
        let raw_name = name.unwrap_or_else(|| "Player".to_string());
        let name = sanitize_player_name(&raw_name, "Player");
        let player_id = Uuid::new_v4().to_string();
        self.add_player(player_id.clone(), name.clone())?;
        self.sessions
            .insert(player_id.clone(), SessionEntry { sender });
        self.broadcast(
            &ServerMessage::PlayerJoined {
                id: player_id.clone(),
                name,
            },
            Some(&player_id),
        );
        Ok(JoinAccepted {
            player_id,
            players: self.player_summaries(),
        })
    }

    fn add_player(&mut self, player_id: String, name: String) -> Result<(), JoinError> {
        if self.started || self.over {
            return Err(JoinError::AlreadyStarted);
        }
        if self.snakes.len() >= self.max_players {
            return Err(JoinError::RoomFull);
        }

        let mut segments = spawn_snake_segments(&mut self.rng, &self.zone);
        for _ in 1..MAX_SPAWN_ATTEMPTS {
            if !self.overlaps_any_snake(&segments) {
                break;
            }
            segments = spawn_snake_segments(&mut self.rng, &self.zone);
        }

        let color = COLOR_POOL[self.joined_total % COLOR_POOL.len()].to_string();
        self.joined_total += 1;
        tracing::debug!(room = %self.code, player_id, "player joined");
        self.snakes
            .push(Snake::new(player_id, name, color, segments));
        Ok(())
    }

    fn overlaps_any_snake(&self, candidate: &VecDeque<Cell>) -> bool {
        candidate.iter().any(|cell| {
            self.snakes
                .iter()
                .any(|snake| snake.occupies(*cell, false))
        })
    }

    fn remove_player(&mut self, player_id: &str) -> bool {
        let Some(index) = self.snake_index(player_id) else { return false };
        self.snakes.remove(index);
        self.sessions.remove(player_id);
        tracing::debug!(room = %self.code, player_id, "player left");
        self.broadcast(
            &ServerMessage::PlayerLeft {
                id: player_id.to_string(),
            },
            None,
        );
        true
    }

    /// First remaining player in join order.
    fn owner_id(&self) -> Option<&str> {
        self.snakes.first().map(|snake| snake.id.as_str())
    }

    fn start_game(&mut self, player_id: &str, now: i64) -> bool {
        if self.started {
            return false;
        }
        if self.owner_id() != Some(player_id) {
            tracing::debug!(room = %self.code, player_id, "start requested by non-owner");
            return false;
        }
        self.started = true;
        self.contenders = self.snakes.len();
        self.zone.schedule_from(now);
        self.move_accumulator = 0;
        self.last_advance_at = Some(now);
        self.last_shrink_seconds = None;
        tracing::info!(room = %self.code, players = self.contenders, "game started");
        true
    }

    fn snake_index(&self, player_id: &str) -> Option<usize> {
        self.snakes.iter().position(|snake| snake.id == player_id)
    }

    fn set_direction(&mut self, player_id: &str, direction: Direction) -> bool {
        if self.over {
            return false;
        }
        let Some(index) = self.snake_index(player_id) else { return false };
        self.snakes[index].buffer_direction(direction)
    }

    fn fire(&mut self, player_id: &str) -> bool {
        if !self.started || self.over {
            return false;
        }
        let Some(index) = self.snake_index(player_id) else { return false };
        let snake = &mut self.snakes[index];
        if !snake.alive || !snake.has_gun || !snake.can_shoot {
            return false;
        }
        let Some(bullet) = bullet_from(snake) else { return false };
        snake.take_gun_charge();
        self.bullets.push(bullet);
        true
    }

    fn activate_dash(&mut self, player_id: &str, now: i64) -> bool {
        if !self.started || self.over {
            return false;
        }
        let Some(index) = self.snake_index(player_id) else { return false };
        self.snakes[index].start_dash(now)
    }

    fn player_summaries(&self) -> Vec<PlayerSummary> {
        self.snakes
            .iter()
            .map(|snake| PlayerSummary {
                id: snake.id.clone(),
                name: snake.name.clone(),
            })
            .collect()
    }

    fn listing(&self) -> RoomListing {
        RoomListing {
            id: self.code.clone(),
            players: self.snakes.len(),
            max_players: self.max_players,
            in_progress: self.started,
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.snakes.iter().map(Snake::snapshot).collect(),
            food: self.food.clone(),
            powerups: self.powerups.clone(),
            bullets: self.bullets.clone(),
            safe_zone: self.zone.clone(),
        }
    }
}
