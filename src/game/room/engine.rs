use super::*;
use crate::game::bullets::step_bullets;
use crate::game::constants::{
    FOOD_SCORE, FOOD_SPAWN_CHANCE, MIN_SNAKE_LENGTH, MOVE_INTERVAL_MS, POWERUP_SPAWN_CHANCE,
};
use crate::game::spawn::{purge_outside_zone, spawn_food, spawn_powerup};
use crate::game::types::PowerupKind;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub events: Vec<RoomEvent>,
    pub snapshot: GameSnapshot,
}

impl RoomState {
    /// Performs one authoritative transition at wall time `now` (milliseconds on the
    /// room's monotonic clock). Returns `None` when the game is not running.
    pub(super) fn advance(&mut self, now: i64) -> Option<TickOutcome> {
        if !self.started || self.over {
            return None;
        }
        let mut events = Vec::new();

        self.maintain_zone(now, &mut events);

        let elapsed = self
            .last_advance_at
            .map(|last| (now - last).max(0))
            .unwrap_or(0);
        self.last_advance_at = Some(now);
        self.move_accumulator += elapsed;
        if self.move_accumulator >= MOVE_INTERVAL_MS {
            self.move_accumulator -= MOVE_INTERVAL_MS;
            self.movement_pass(now, &mut events);
        }

        step_bullets(&mut self.bullets, &mut self.snakes, &self.zone, &mut events);
        self.check_winner(&mut events);
        self.opportunistic_spawns();

        Some(TickOutcome {
            events,
            snapshot: self.snapshot(),
        })
    }

    fn maintain_zone(&mut self, now: i64, events: &mut Vec<RoomEvent>) {
        if self.zone.try_shrink(now) {
            let (food_removed, powerups_removed) =
                purge_outside_zone(&mut self.food, &mut self.powerups, &self.zone);
            for _ in 0..food_removed {
                spawn_food(&mut self.rng, &mut self.food, &self.zone);
            }
            for _ in 0..powerups_removed {
                spawn_powerup(&mut self.rng, &mut self.powerups, &self.zone);
            }
            tracing::debug!(room = %self.code, radius = self.zone.radius, "safe zone shrank");
            events.push(RoomEvent::ZoneUpdate {
                radius: self.zone.radius,
                shrinking: self.zone.shrinking,
            });
        } else if self.zone.refresh_warning(now) {
            events.push(RoomEvent::ZoneUpdate {
                radius: self.zone.radius,
                shrinking: self.zone.shrinking,
            });
        }

        let seconds = self.zone.seconds_until_shrink(now);
        if seconds != self.last_shrink_seconds {
            self.last_shrink_seconds = seconds;
            if let Some(seconds) = seconds {
                events.push(RoomEvent::ShrinkTimer { seconds });
            }
        }
    }

    /// Moves every living snake one step. Targets are planned against the pre-move
    /// board so that the outcome does not depend on iteration order.
    fn movement_pass(&mut self, now: i64, events: &mut Vec<RoomEvent>) {
        for snake in self.snakes.iter_mut() {
            if snake.alive && snake.segments.len() < MIN_SNAKE_LENGTH {
                tracing::error!(
                    room = %self.code,
                    player_id = %snake.id,
                    len = snake.segments.len(),
                    "snake below minimum length, removing from play"
                );
                snake.kill();
                events.push(RoomEvent::PlayerDied {
                    player_id: snake.id.clone(),
                });
            }
        }

        let mut planned: Vec<(usize, Cell)> = Vec::new();
        for (index, snake) in self.snakes.iter_mut().enumerate() {
            if !snake.alive {
                continue;
            }
            if snake.expire_dash(now) {
                events.push(RoomEvent::DashEnded {
                    player_id: snake.id.clone(),
                });
            }
            snake.commit_direction();
            let Some(head) = snake.next_head() else { continue };
            if !self.zone.contains_cell(head) {
                snake.kill();
                tracing::debug!(room = %self.code, player_id = %snake.id, "left the safe zone");
                events.push(RoomEvent::PlayerDied {
                    player_id: snake.id.clone(),
                });
                continue;
            }
            planned.push((index, head));
        }

        let collided: Vec<bool> = planned
            .iter()
            .enumerate()
            .map(|(slot, &(index, head))| {
                let hits_body = self
                    .snakes
                    .iter()
                    .enumerate()
                    .any(|(other, snake)| snake.alive && snake.occupies(head, other == index));
                let hits_head = planned
                    .iter()
                    .enumerate()
                    .any(|(other_slot, &(_, other_head))| other_slot != slot && other_head == head);
                hits_body || hits_head
            })
            .collect();

        for ((index, head), collided) in planned.into_iter().zip(collided) {
            let snake = &mut self.snakes[index];
            if collided {
                snake.kill();
                tracing::debug!(room = %self.code, player_id = %snake.id, "collided");
                events.push(RoomEvent::PlayerDied {
                    player_id: snake.id.clone(),
                });
                continue;
            }

            let mut grew = false;
            if let Some(position) = self.food.iter().position(|food| food.cell() == head) {
                self.food.remove(position);
                snake.score += FOOD_SCORE;
                grew = true;
                spawn_food(&mut self.rng, &mut self.food, &self.zone);
            }
            if let Some(position) = self.powerups.iter().position(|item| item.cell() == head) {
                let powerup = self.powerups.remove(position);
                snake.grant_powerup(powerup.kind);
                let player_id = snake.id.clone();
                events.push(match powerup.kind {
                    PowerupKind::Gun => RoomEvent::GunCollected { player_id },
                    PowerupKind::Dash => RoomEvent::DashCollected { player_id },
                });
                spawn_powerup(&mut self.rng, &mut self.powerups, &self.zone);
            }
            snake.advance(head, grew);
        }
    }

    /// Ends the game once at most one contender is left standing. Everyone dying in
    /// the same tick ends it without a winner.
    fn check_winner(&mut self, events: &mut Vec<RoomEvent>) {
        if self.over || self.contenders < 2 {
            return;
        }
        let mut alive = self.snakes.iter().filter(|snake| snake.alive);
        let winner = match (alive.next(), alive.next()) {
            (Some(survivor), None) => Some(survivor.id.clone()),
            (None, _) => None,
            _ => return,
        };
        self.over = true;
        self.winner = winner.clone();
        tracing::info!(room = %self.code, winner = ?winner, "game over");
        events.push(RoomEvent::GameOver { winner });
    }

    fn opportunistic_spawns(&mut self) {
        if self.rng.gen_bool(FOOD_SPAWN_CHANCE) {
            spawn_food(&mut self.rng, &mut self.food, &self.zone);
        }
        if self.rng.gen_bool(POWERUP_SPAWN_CHANCE) {
            spawn_powerup(&mut self.rng, &mut self.powerups, &self.zone);
        }
    }
}
