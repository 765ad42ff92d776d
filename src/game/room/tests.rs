use super::*;
use crate::game::constants::{
    DASH_DURATION_MS, FOOD_SCORE, INITIAL_ZONE_RADIUS, MAX_FOOD, MAX_POWERUPS, MIN_SNAKE_LENGTH,
    MOVE_INTERVAL_MS, SHRINK_AMOUNT, SHRINK_INTERVAL_MS,
};
use crate::game::types::{FoodKind, Point, PowerupKind};
use serde_json::Value;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

fn make_state(max_players: usize) -> RoomState {
    RoomState::new("TEST01".to_string(), max_players, StdRng::seed_from_u64(7), 0)
}

fn cells(points: &[(i32, i32)]) -> VecDeque<Cell> {
    points.iter().map(|&(x, y)| Cell { x, y }).collect()
}

fn add(state: &mut RoomState, id: &str) {
    state
        .add_player(id.to_string(), id.to_string())
        .expect("player should join");
}

fn place(state: &mut RoomState, id: &str, points: &[(i32, i32)], direction: Direction) {
    let index = state.snake_index(id).expect("snake");
    let snake = &mut state.snakes[index];
    snake.segments = cells(points);
    snake.direction = direction;
    snake.next_direction = Direction::None;
}

/// Fills both pickup quotas with items far from the rows the scenarios use, so
/// random spawns never land in a snake's path.
fn park_pickups(state: &mut RoomState) {
    state.food = (0..MAX_FOOD as i32)
        .map(|offset| Food {
            x: 18 + offset,
            y: 36,
            kind: FoodKind::Regular,
        })
        .collect();
    state.powerups = (0..MAX_POWERUPS as i32)
        .map(|offset| Powerup {
            x: 18 + offset,
            y: 4,
            kind: PowerupKind::Gun,
        })
        .collect();
}

fn snake<'a>(state: &'a RoomState, id: &str) -> &'a Snake {
    let index = state.snake_index(id).expect("snake");
    &state.snakes[index]
}

fn head(state: &RoomState, id: &str) -> Cell {
    snake(state, id).head().expect("head")
}

fn started_solo() -> RoomState {
    let mut state = make_state(4);
    add(&mut state, "a");
    park_pickups(&mut state);
    place(&mut state, "a", &[(20, 20), (19, 20), (18, 20)], Direction::Right);
    assert!(state.start_game("a", 0));
    state
}

fn started_duel() -> RoomState {
    let mut state = make_state(4);
    add(&mut state, "a");
    add(&mut state, "b");
    park_pickups(&mut state);
    assert!(state.start_game("a", 0));
    state
}

fn drain_types(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
    let mut types = Vec::new();
    while let Ok(payload) = rx.try_recv() {
        let value: Value = serde_json::from_str(&payload).expect("valid json");
        types.push(value["type"].as_str().unwrap_or_default().to_string());
    }
    types
}

#[test]
fn new_room_fills_pickup_quotas() {
    let state = make_state(4);
    assert_eq!(state.food.len(), MAX_FOOD);
    assert_eq!(state.powerups.len(), MAX_POWERUPS);
    assert!(state.food.iter().all(|item| state.zone.contains_cell(item.cell())));
}

#[test]
fn advance_is_inert_until_started() {
    let mut state = make_state(4);
    add(&mut state, "a");
    assert!(state.advance(1_000).is_none());
}

#[test]
fn joins_cycle_through_color_pool() {
    let mut state = make_state(10);
    for index in 0..10 {
        add(&mut state, &format!("p{index}"));
    }
    let colors: Vec<&str> = state.snakes.iter().map(|snake| snake.color.as_str()).collect();
    assert_eq!(colors[0], COLOR_POOL[0]);
    assert_eq!(colors[7], COLOR_POOL[7]);
    assert_eq!(colors[8], COLOR_POOL[0]);
    for snake in &state.snakes {
        assert_eq!(snake.segments.len(), MIN_SNAKE_LENGTH);
        assert_eq!(snake.direction, Direction::None);
    }
}

#[test]
fn join_rejected_when_full_or_started() {
    let mut state = make_state(2);
    add(&mut state, "a");
    add(&mut state, "b");
    assert_eq!(
        state.add_player("c".to_string(), "c".to_string()),
        Err(JoinError::RoomFull)
    );
    assert!(state.start_game("a", 0));
    assert_eq!(
        state.add_player("d".to_string(), "d".to_string()),
        Err(JoinError::AlreadyStarted)
    );
}

#[test]
fn only_owner_starts_and_start_is_idempotent() {
    let mut state = make_state(4);
    add(&mut state, "a");
    add(&mut state, "b");
    assert!(!state.start_game("b", 0));
    assert!(!state.started);
    assert!(state.start_game("a", 0));
    assert!(!state.start_game("a", 10));
    assert_eq!(state.contenders, 2);
}

#[test]
fn ownership_passes_to_next_player_in_join_order() {
    let mut state = make_state(4);
    add(&mut state, "a");
    add(&mut state, "b");
    add(&mut state, "c");
    assert!(state.remove_player("a"));
    assert_eq!(state.owner_id(), Some("b"));
    assert!(!state.remove_player("a"));
}

#[test]
fn fresh_snake_waits_for_a_direction() {
    let mut state = make_state(4);
    add(&mut state, "a");
    park_pickups(&mut state);
    let before = snake(&state, "a").segments.clone();
    assert!(state.start_game("a", 0));
    state.advance(MOVE_INTERVAL_MS);
    assert_eq!(snake(&state, "a").segments, before);
}

#[test]
fn movement_waits_for_interval_and_keeps_remainder() {
    let mut state = started_solo();
    state.advance(150);
    assert_eq!(head(&state, "a"), Cell { x: 20, y: 20 });
    state.advance(200);
    assert_eq!(head(&state, "a"), Cell { x: 21, y: 20 });

    // A late tick moves once and carries the surplus forward.
    state.advance(450);
    assert_eq!(head(&state, "a"), Cell { x: 22, y: 20 });
    assert_eq!(state.move_accumulator, 50);
    state.advance(600);
    assert_eq!(head(&state, "a"), Cell { x: 23, y: 20 });
}

#[test]
fn repeated_advance_at_same_time_changes_nothing() {
    let mut state = started_solo();
    let first = state.advance(MOVE_INTERVAL_MS).expect("running");
    assert!(first
        .events
        .contains(&RoomEvent::ShrinkTimer { seconds: 30 }));
    let second = state.advance(MOVE_INTERVAL_MS).expect("running");
    assert!(second.events.is_empty());
    assert_eq!(first.snapshot.players[0].segments, second.snapshot.players[0].segments);
    assert_eq!(state.food.len(), MAX_FOOD);
}

#[test]
fn snake_wraps_across_edges_and_never_shrinks_below_minimum() {
    let mut state = started_solo();
    place(&mut state, "a", &[(39, 20), (38, 20), (37, 20)], Direction::Right);
    state.advance(MOVE_INTERVAL_MS);
    assert_eq!(head(&state, "a"), Cell { x: 0, y: 20 });

    let mut now = MOVE_INTERVAL_MS;
    for _ in 0..60 {
        now += MOVE_INTERVAL_MS;
        state.advance(now);
        assert!(snake(&state, "a").alive);
        assert!(snake(&state, "a").segments.len() >= MIN_SNAKE_LENGTH);
    }
}

#[test]
fn eating_food_grows_and_scores() {
    let mut state = started_solo();
    state.food[0] = Food {
        x: 21,
        y: 20,
        kind: FoodKind::Regular,
    };
    state.advance(MOVE_INTERVAL_MS);
    let eater = snake(&state, "a");
    assert_eq!(eater.segments.len(), MIN_SNAKE_LENGTH + 1);
    assert_eq!(eater.score, FOOD_SCORE);
    assert_eq!(eater.segments.back(), Some(&Cell { x: 18, y: 20 }));
    assert_eq!(state.food.len(), MAX_FOOD);
}

#[test]
fn collecting_powerup_grants_charge_and_notifies() {
    let mut state = started_solo();
    state.powerups[0] = Powerup {
        x: 21,
        y: 20,
        kind: PowerupKind::Dash,
    };
    let outcome = state.advance(MOVE_INTERVAL_MS).expect("running");
    assert!(outcome.events.contains(&RoomEvent::DashCollected {
        player_id: "a".to_string()
    }));
    let collector = snake(&state, "a");
    assert!(collector.has_dash && collector.can_dash);
    assert_eq!(state.powerups.len(), MAX_POWERUPS);
}

#[test]
fn leaving_the_zone_is_fatal() {
    let mut state = started_solo();
    state.zone.radius = 5.0;
    place(&mut state, "a", &[(25, 20), (24, 20), (23, 20)], Direction::Right);
    let outcome = state.advance(MOVE_INTERVAL_MS).expect("running");
    assert!(!snake(&state, "a").alive);
    assert_eq!(head(&state, "a"), Cell { x: 25, y: 20 });
    assert!(outcome.events.contains(&RoomEvent::PlayerDied {
        player_id: "a".to_string()
    }));
    // A solo game has no contest to settle.
    assert!(!state.over);
}

#[test]
fn head_on_collision_kills_both_and_ends_in_a_draw() {
    let mut state = started_duel();
    place(&mut state, "a", &[(20, 20), (19, 20), (18, 20)], Direction::Right);
    place(&mut state, "b", &[(22, 20), (23, 20), (24, 20)], Direction::Left);
    let outcome = state.advance(MOVE_INTERVAL_MS).expect("running");
    assert!(!snake(&state, "a").alive);
    assert!(!snake(&state, "b").alive);
    assert!(state.over);
    assert_eq!(state.winner, None);
    assert_eq!(outcome.events.last(), Some(&RoomEvent::GameOver { winner: None }));
    assert!(state.advance(2 * MOVE_INTERVAL_MS).is_none());
}

#[test]
fn body_collision_decides_winner_in_same_tick() {
    let mut state = started_duel();
    place(&mut state, "a", &[(20, 20), (19, 20), (18, 20)], Direction::Right);
    place(&mut state, "b", &[(19, 21), (19, 22), (19, 23)], Direction::Up);
    let outcome = state.advance(MOVE_INTERVAL_MS).expect("running");
    assert!(snake(&state, "a").alive);
    assert!(!snake(&state, "b").alive);
    assert!(state.over);
    assert_eq!(state.winner.as_deref(), Some("a"));
    assert!(outcome.events.contains(&RoomEvent::PlayerDied {
        player_id: "b".to_string()
    }));
    assert!(outcome.events.contains(&RoomEvent::GameOver {
        winner: Some("a".to_string())
    }));
}

#[test]
fn input_is_ignored_once_game_is_over() {
    let mut state = started_duel();
    place(&mut state, "a", &[(20, 20), (19, 20), (18, 20)], Direction::Right);
    place(&mut state, "b", &[(19, 21), (19, 22), (19, 23)], Direction::Up);
    state.advance(MOVE_INTERVAL_MS);
    assert!(state.over);
    assert!(!state.set_direction("a", Direction::Up));
    assert!(!state.fire("a"));
}

#[test]
fn fire_spends_gun_charge() {
    let mut state = started_solo();
    assert!(!state.fire("a"));
    state.snakes[0].grant_powerup(PowerupKind::Gun);
    assert!(state.fire("a"));
    assert_eq!(state.bullets.len(), 1);
    assert_eq!(state.bullets[0].owner_id, "a");
    assert!((state.bullets[0].x - 20.5).abs() < 1e-9);
    assert!(!state.snakes[0].has_gun);
    assert!(!state.fire("a"));
    assert_eq!(state.bullets.len(), 1);
}

#[test]
fn fire_without_heading_keeps_charge() {
    let mut state = started_solo();
    state.snakes[0].direction = Direction::None;
    state.snakes[0].grant_powerup(PowerupKind::Gun);
    assert!(!state.fire("a"));
    assert!(state.snakes[0].has_gun);
    assert!(state.bullets.is_empty());
}

#[test]
fn bullet_leaving_zone_is_gone_from_snapshot() {
    let mut state = started_solo();
    state.zone.radius = 5.0;
    place(&mut state, "a", &[(20, 22), (19, 22), (18, 22)], Direction::None);
    state.bullets.push(Bullet {
        x: 24.9,
        y: 20.5,
        direction: Point { x: 1.0, y: 0.0 },
        owner_id: "a".to_string(),
        active: true,
    });
    let outcome = state.advance(50).expect("running");
    assert!(outcome.snapshot.bullets.is_empty());
    assert!(state.bullets.is_empty());
}

#[test]
fn dash_moves_four_cells_then_expires() {
    let mut state = started_solo();
    place(&mut state, "a", &[(2, 20), (1, 20), (0, 20)], Direction::Right);
    state.snakes[0].grant_powerup(PowerupKind::Dash);
    assert!(state.activate_dash("a", 0));
    assert!(!state.activate_dash("a", 0));

    state.advance(MOVE_INTERVAL_MS);
    assert_eq!(head(&state, "a"), Cell { x: 6, y: 20 });

    let mut ended = 0;
    let mut now = MOVE_INTERVAL_MS;
    while now < DASH_DURATION_MS + MOVE_INTERVAL_MS {
        now += MOVE_INTERVAL_MS;
        let outcome = state.advance(now).expect("running");
        ended += outcome
            .events
            .iter()
            .filter(|event| matches!(event, RoomEvent::DashEnded { .. }))
            .count();
    }
    assert_eq!(ended, 1);
    assert!(!state.snakes[0].is_dashing);
}

#[test]
fn zone_shrinks_monotonically_and_keeps_pickups_inside() {
    let mut state = started_solo();
    place(&mut state, "a", &[(20, 20), (20, 21), (20, 22)], Direction::None);
    let mut previous = state.zone.radius;
    let mut saw_warning = false;
    let mut zone_updates = 0;
    let mut now = 0;
    while now < 5 * SHRINK_INTERVAL_MS {
        now += 50;
        let outcome = state.advance(now).expect("running");
        zone_updates += outcome
            .events
            .iter()
            .filter(|event| matches!(event, RoomEvent::ZoneUpdate { .. }))
            .count();
        saw_warning |= state.zone.shrinking;
        assert!(state.zone.radius <= previous);
        previous = state.zone.radius;
        assert!(state.food.iter().all(|item| state.zone.contains_cell(item.cell())));
        assert!(state
            .powerups
            .iter()
            .all(|item| state.zone.contains_cell(item.cell())));
    }
    assert!(saw_warning);
    assert!(zone_updates >= 5);
    assert_eq!(state.zone.radius, INITIAL_ZONE_RADIUS - 5.0 * SHRINK_AMOUNT);
    assert_eq!(state.food.len(), MAX_FOOD);
    assert_eq!(state.powerups.len(), MAX_POWERUPS);
}

#[test]
fn join_announces_to_others_only() {
    let mut state = make_state(4);
    let (first_tx, mut first_rx) = unbounded_channel();
    let (second_tx, mut second_rx) = unbounded_channel();
    let first = state
        .join(Some("   Ana   Lee ".to_string()), first_tx)
        .expect("first join");
    assert_eq!(first.players.len(), 1);
    assert_eq!(first.players[0].name, "Ana Lee");

    let second = state.join(None, second_tx).expect("second join");
    assert_eq!(second.players.len(), 2);
    assert_eq!(second.players[1].name, "Player");
    assert_eq!(drain_types(&mut first_rx), vec!["playerJoined"]);
    assert!(drain_types(&mut second_rx).is_empty());
}

#[test]
fn broadcast_skips_closed_sessions() {
    let mut state = make_state(4);
    let (first_tx, first_rx) = unbounded_channel();
    let (second_tx, mut second_rx) = unbounded_channel();
    state.join(None, first_tx).expect("first join");
    state.join(None, second_tx).expect("second join");
    drop(first_rx);

    state.broadcast(&ServerMessage::GameStarted, None);
    assert_eq!(drain_types(&mut second_rx), vec!["gameStarted"]);
}

#[test]
fn player_scoped_events_reach_only_their_player() {
    let mut state = make_state(4);
    let (first_tx, mut first_rx) = unbounded_channel();
    let (second_tx, mut second_rx) = unbounded_channel();
    let first = state.join(None, first_tx).expect("first join");
    state.join(None, second_tx).expect("second join");
    drain_types(&mut first_rx);

    state.publish(TickOutcome {
        events: vec![
            RoomEvent::GunCollected {
                player_id: first.player_id.clone(),
            },
            RoomEvent::PlayerDied {
                player_id: first.player_id,
            },
        ],
        snapshot: state.snapshot(),
    });
    assert_eq!(
        drain_types(&mut first_rx),
        vec!["gunCollected", "playerDied", "gameUpdate"]
    );
    assert_eq!(drain_types(&mut second_rx), vec!["playerDied", "gameUpdate"]);
}

#[tokio::test]
async fn room_reports_empty_after_everyone_leaves() {
    let room = Room::new("ROOM01".to_string(), 4, 0);
    let (tx, mut rx) = unbounded_channel();
    let accepted = room.join(Some("Solo".to_string()), tx).await.expect("join");
    assert!(room.start(&accepted.player_id, 0).await);
    assert!(!room.start(&accepted.player_id, 0).await);
    assert_eq!(drain_types(&mut rx), vec!["gameStarted", "gameUpdate"]);

    assert_eq!(room.tick(50).await, TickStatus::Running);
    assert!(drain_types(&mut rx).contains(&"gameUpdate".to_string()));

    assert_eq!(room.leave(&accepted.player_id).await, 0);
    assert_eq!(room.tick(100).await, TickStatus::Empty);
    assert!(!room.is_running());
}
