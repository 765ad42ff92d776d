use super::constants::{
    GRID_CENTER, GRID_SIZE, INITIAL_SNAKE_LENGTH, MAX_FOOD, MAX_POWERUPS, MAX_SPAWN_ATTEMPTS,
    SNAKE_SPAWN_RADIUS_FRACTION,
};
use super::math::{cell_distance_from_center, wrap_cell};
use super::types::{Cell, Direction, Food, FoodKind, Powerup, PowerupKind, SafeZone};
use rand::Rng;
use std::collections::VecDeque;

const SPAWN_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

fn center_cell() -> Cell {
    Cell {
        x: GRID_CENTER as i32,
        y: GRID_CENTER as i32,
    }
}

/// Rejection-samples a uniformly random grid cell inside the zone, falling back to
/// the center cell once the attempt budget runs out.
pub fn random_cell_in_zone<R: Rng>(rng: &mut R, zone: &SafeZone) -> Cell {
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let cell = Cell {
            x: rng.gen_range(0..GRID_SIZE),
            y: rng.gen_range(0..GRID_SIZE),
        };
        if zone.contains_cell(cell) {
            return cell;
        }
    }
    tracing::warn!(radius = zone.radius, "spawn sampling exhausted, using center cell");
    center_cell()
}

pub fn spawn_food<R: Rng>(rng: &mut R, food: &mut Vec<Food>, zone: &SafeZone) -> bool {
    if food.len() >= MAX_FOOD {
        return false;
    }
    let cell = random_cell_in_zone(rng, zone);
    food.push(Food {
        x: cell.x,
        y: cell.y,
        kind: FoodKind::Regular,
    });
    true
}

pub fn spawn_powerup<R: Rng>(rng: &mut R, powerups: &mut Vec<Powerup>, zone: &SafeZone) -> bool {
    if powerups.len() >= MAX_POWERUPS {
        return false;
    }
    let cell = random_cell_in_zone(rng, zone);
    let kind = if rng.gen_bool(0.5) {
        PowerupKind::Gun
    } else {
        PowerupKind::Dash
    };
    powerups.push(Powerup {
        x: cell.x,
        y: cell.y,
        kind,
    });
    true
}

pub fn fill_food<R: Rng>(rng: &mut R, food: &mut Vec<Food>, zone: &SafeZone) {
    while spawn_food(rng, food, zone) {}
}

pub fn fill_powerups<R: Rng>(rng: &mut R, powerups: &mut Vec<Powerup>, zone: &SafeZone) {
    while spawn_powerup(rng, powerups, zone) {}
}

/// Drops every pickup that the zone no longer covers. Returns the removed
/// `(food, powerups)` counts.
pub fn purge_outside_zone(
    food: &mut Vec<Food>,
    powerups: &mut Vec<Powerup>,
    zone: &SafeZone,
) -> (usize, usize) {
    let food_before = food.len();
    let powerups_before = powerups.len();
    food.retain(|item| zone.contains_cell(item.cell()));
    powerups.retain(|item| zone.contains_cell(item.cell()));
    (food_before - food.len(), powerups_before - powerups.len())
}

/// Lays out a fresh snake as collinear cells, head first, strictly inside the zone.
pub fn spawn_snake_segments<R: Rng>(rng: &mut R, zone: &SafeZone) -> VecDeque<Cell> {
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let angle = rng.gen::<f64>() * std::f64::consts::PI * 2.0;
        let distance = rng.gen::<f64>() * zone.radius * SNAKE_SPAWN_RADIUS_FRACTION;
        let head = Cell {
            x: (GRID_CENTER + angle.cos() * distance).floor() as i32,
            y: (GRID_CENTER + angle.sin() * distance).floor() as i32,
        };
        let facing = SPAWN_DIRECTIONS[rng.gen_range(0..SPAWN_DIRECTIONS.len())];
        let segments = trailing_segments(head, facing);
        if segments
            .iter()
            .all(|cell| cell_distance_from_center(*cell) < zone.radius)
        {
            return segments;
        }
    }
    trailing_segments(center_cell(), Direction::Right)
}

fn trailing_segments(head: Cell, facing: Direction) -> VecDeque<Cell> {
    let (dx, dy) = facing.offset();
    (0..INITIAL_SNAKE_LENGTH as i32)
        .map(|index| {
            wrap_cell(Cell {
                x: head.x - dx * index,
                y: head.y - dy * index,
            })
        })
        .collect()
}
