use super::constants::{DASH_DURATION_MS, DASH_STEP, MIN_SNAKE_LENGTH};
use super::math::wrap_cell;
use super::types::{Cell, Direction, PlayerSnapshot, PowerupKind, Snake};
use std::collections::VecDeque;

impl Snake {
    pub fn new(id: String, name: String, color: String, segments: VecDeque<Cell>) -> Self {
        Self {
            id,
            name,
            color,
            segments,
            direction: Direction::None,
            next_direction: Direction::None,
            alive: true,
            score: 0,
            has_gun: false,
            can_shoot: false,
            has_dash: false,
            can_dash: false,
            is_dashing: false,
            dash_end_at: 0,
        }
    }

    pub fn head(&self) -> Option<Cell> {
        self.segments.front().copied()
    }

    /// Committed direction, or for a snake that has not moved yet the way its
    /// head points away from its neck.
    pub fn facing(&self) -> Direction {
        if self.direction != Direction::None {
            return self.direction;
        }
        let (Some(head), Some(neck)) = (self.segments.front(), self.segments.get(1)) else {
            return Direction::None;
        };
        match (unwrap_delta(head.x - neck.x), unwrap_delta(head.y - neck.y)) {
            (1, 0) => Direction::Right,
            (-1, 0) => Direction::Left,
            (0, 1) => Direction::Down,
            (0, -1) => Direction::Up,
            _ => Direction::None,
        }
    }

    /// Buffers a direction for the next movement pass. Reversals and input from a
    /// dead snake are ignored.
    pub fn buffer_direction(&mut self, direction: Direction) -> bool {
        if !self.alive || direction == Direction::None {
            return false;
        }
        if direction.reverses(self.facing()) {
            return false;
        }
        self.next_direction = direction;
        true
    }

    pub fn commit_direction(&mut self) -> Direction {
        if self.next_direction != Direction::None {
            self.direction = self.next_direction;
        }
        self.direction
    }

    pub fn step_distance(&self) -> i32 {
        if self.is_dashing {
            DASH_STEP
        } else {
            1
        }
    }

    /// Head cell after one step in the committed direction, wrapped around the grid.
    pub fn next_head(&self) -> Option<Cell> {
        if self.direction == Direction::None {
            return None;
        }
        let head = self.head()?;
        let (dx, dy) = self.direction.offset();
        let step = self.step_distance();
        Some(wrap_cell(Cell {
            x: head.x + dx * step,
            y: head.y + dy * step,
        }))
    }

    pub fn advance(&mut self, head: Cell, grew: bool) {
        self.segments.push_front(head);
        if !grew {
            self.segments.pop_back();
        }
    }

    pub fn occupies(&self, cell: Cell, skip_head: bool) -> bool {
        let skip = usize::from(skip_head);
        self.segments.iter().skip(skip).any(|segment| *segment == cell)
    }

    /// Removes up to `count` tail segments without going below the minimum length.
    pub fn truncate_tail(&mut self, count: usize) -> usize {
        let removable = self.segments.len().saturating_sub(MIN_SNAKE_LENGTH).min(count);
        let keep = self.segments.len() - removable;
        self.segments.truncate(keep);
        removable
    }

    pub fn kill(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.is_dashing = false;
        true
    }

    pub fn grant_powerup(&mut self, kind: PowerupKind) {
        match kind {
            PowerupKind::Gun => {
                self.has_gun = true;
                self.can_shoot = true;
            }
            PowerupKind::Dash => {
                self.has_dash = true;
                self.can_dash = true;
            }
        }
    }

    pub fn take_gun_charge(&mut self) -> bool {
        if !self.alive || !self.has_gun || !self.can_shoot {
            return false;
        }
        self.has_gun = false;
        self.can_shoot = false;
        true
    }

    pub fn start_dash(&mut self, now: i64) -> bool {
        if !self.alive || !self.has_dash || !self.can_dash {
            return false;
        }
        self.has_dash = false;
        self.can_dash = false;
        self.is_dashing = true;
        self.dash_end_at = now + DASH_DURATION_MS;
        true
    }

    pub fn expire_dash(&mut self, now: i64) -> bool {
        if !self.is_dashing || now < self.dash_end_at {
            return false;
        }
        self.is_dashing = false;
        true
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            segments: self.segments.iter().copied().collect(),
            score: self.score,
            alive: self.alive,
            color: self.color.clone(),
        }
    }
}

fn unwrap_delta(delta: i32) -> i32 {
    if delta > 1 {
        -1
    } else if delta < -1 {
        1
    } else {
        delta
    }
}
