use super::constants::{BULLET_DAMAGE_SEGMENTS, BULLET_SPEED, KILL_SCORE, MIN_SNAKE_LENGTH};
use super::math::{floor_cell, in_grid_bounds};
use super::types::{Bullet, Direction, Point, RoomEvent, SafeZone, Snake};

/// Builds a bullet leaving the center of the snake's head cell along its committed direction.
pub fn bullet_from(snake: &Snake) -> Option<Bullet> {
    if snake.direction == Direction::None {
        return None;
    }
    let head = snake.head()?;
    Some(Bullet {
        x: head.x as f64 + 0.5,
        y: head.y as f64 + 0.5,
        direction: snake.direction.unit_vector(),
        owner_id: snake.id.clone(),
        active: true,
    })
}

pub fn step_bullets(
    bullets: &mut Vec<Bullet>,
    snakes: &mut [Snake],
    zone: &SafeZone,
    events: &mut Vec<RoomEvent>,
) {
    for bullet in bullets.iter_mut().filter(|bullet| bullet.active) {
        bullet.x += bullet.direction.x * BULLET_SPEED;
        bullet.y += bullet.direction.y * BULLET_SPEED;
        let position = Point {
            x: bullet.x,
            y: bullet.y,
        };
        if !in_grid_bounds(position) || !zone.contains_point(position) {
            bullet.active = false;
            continue;
        }

        let cell = floor_cell(position);
        let Some(target_index) = snakes
            .iter()
            .position(|snake| snake.id != bullet.owner_id && snake.occupies(cell, false))
        else {
            continue;
        };
        bullet.active = false;

        // Dead bodies stay on the board and absorb shots.
        if !snakes[target_index].alive {
            continue;
        }

        let target = &mut snakes[target_index];
        if target.segments.len() > MIN_SNAKE_LENGTH {
            target.truncate_tail(BULLET_DAMAGE_SEGMENTS);
            tracing::debug!(player_id = %target.id, len = target.segments.len(), "player hit");
            events.push(RoomEvent::PlayerHit {
                player_id: target.id.clone(),
            });
            continue;
        }

        target.kill();
        let victim_id = target.id.clone();
        tracing::debug!(player_id = %victim_id, shooter = %bullet.owner_id, "player shot down");
        events.push(RoomEvent::PlayerDied {
            player_id: victim_id,
        });
        if let Some(shooter) = snakes.iter_mut().find(|snake| snake.id == bullet.owner_id) {
            shooter.score += KILL_SCORE;
        }
    }

    bullets.retain(|bullet| bullet.active);
}
