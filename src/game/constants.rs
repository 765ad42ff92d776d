pub const GRID_SIZE: i32 = 40;
pub const GRID_CENTER: f64 = GRID_SIZE as f64 / 2.0;
pub const INITIAL_SNAKE_LENGTH: usize = 3;
pub const MIN_SNAKE_LENGTH: usize = 3;
pub const SNAKE_SPAWN_RADIUS_FRACTION: f64 = 0.7;

pub const TICK_MS: u64 = 50;
pub const MOVE_INTERVAL_MS: i64 = 200;
pub const DASH_STEP: i32 = 4;
pub const DASH_DURATION_MS: i64 = 1500;

pub const INITIAL_ZONE_RADIUS: f64 = GRID_SIZE as f64 / 2.0;
pub const MIN_ZONE_RADIUS: f64 = 5.0;
pub const SHRINK_AMOUNT: f64 = 1.0;
pub const SHRINK_INTERVAL_MS: i64 = 30_000;
pub const SHRINK_WARNING_MS: i64 = 5_000;

pub const MAX_FOOD: usize = 3;
pub const MAX_POWERUPS: usize = 2;
pub const FOOD_SPAWN_CHANCE: f64 = 0.02;
pub const POWERUP_SPAWN_CHANCE: f64 = 0.005;
pub const MAX_SPAWN_ATTEMPTS: usize = 64;

pub const FOOD_SCORE: i64 = 10;
pub const KILL_SCORE: i64 = 10;

pub const BULLET_SPEED: f64 = 0.5;
pub const BULLET_DAMAGE_SEGMENTS: usize = 3;

pub const MAX_PLAYERS_PER_ROOM: usize = 10;
pub const ROOM_CODE_LENGTH: usize = 6;
pub const GAME_OVER_GRACE_MS: u64 = 60_000;

pub const COLOR_POOL: [&str; 8] = [
    "#FF5733", "#33FF57", "#3357FF", "#F3FF33", "#FF33F3", "#33FFF3", "#FF8C33", "#8C33FF",
];
