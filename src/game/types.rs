use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// `None` never reverses anything.
    pub fn reverses(self, other: Direction) -> bool {
        self != Direction::None && other != Direction::None && self == other.opposite()
    }

    pub fn unit_vector(self) -> Point {
        let (dx, dy) = self.offset();
        Point {
            x: dx as f64,
            y: dy as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Food {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: FoodKind,
}

impl Food {
    pub fn cell(&self) -> Cell {
        Cell {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerupKind {
    Gun,
    Dash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Powerup {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: PowerupKind,
}

impl Powerup {
    pub fn cell(&self) -> Cell {
        Cell {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bullet {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    pub direction: Point,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
    #[serde(skip)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafeZone {
    pub radius: f64,
    pub shrinking: bool,
    #[serde(skip)]
    pub next_shrink_at: i64,
}

#[derive(Debug, Clone)]
pub struct Snake {
    pub id: String,
    pub name: String,
    pub color: String,
    pub segments: VecDeque<Cell>,
    pub direction: Direction,
    pub next_direction: Direction,
    pub alive: bool,
    pub score: i64,
    pub has_gun: bool,
    pub can_shoot: bool,
    pub has_dash: bool,
    pub can_dash: bool,
    pub is_dashing: bool,
    pub dash_end_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub segments: Vec<Cell>,
    pub score: i64,
    pub alive: bool,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerSnapshot>,
    pub food: Vec<Food>,
    pub powerups: Vec<Powerup>,
    pub bullets: Vec<Bullet>,
    #[serde(rename = "safeZone")]
    pub safe_zone: SafeZone,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
}

/// Discrete notifications raised by the engine alongside the per-tick snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    PlayerDied { player_id: String },
    PlayerHit { player_id: String },
    GunCollected { player_id: String },
    DashCollected { player_id: String },
    DashEnded { player_id: String },
    GameOver { winner: Option<String> },
    ZoneUpdate { radius: f64, shrinking: bool },
    ShrinkTimer { seconds: i64 },
}

impl RoomEvent {
    /// Player-scoped pickups and hits go only to the affected player.
    pub fn recipient(&self) -> Option<&str> {
        match self {
            RoomEvent::PlayerHit { player_id }
            | RoomEvent::GunCollected { player_id }
            | RoomEvent::DashCollected { player_id }
            | RoomEvent::DashEnded { player_id } => Some(player_id),
            _ => None,
        }
    }
}
