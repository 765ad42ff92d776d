use crate::app::time::now_millis;
use crate::control::RoomRegistry;
use crate::game::room::{Room, TickStatus};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

/// Drives a started room at the configured tick rate until it empties or its
/// game ends. At most one loop runs per room.
pub fn spawn_room_loop(room: Arc<Room>, registry: Arc<RoomRegistry>) {
    if !room.try_mark_running() {
        return;
    }
    let settings = registry.settings();
    let loop_room = Arc::clone(&room);
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(settings.tick_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match loop_room.tick(now_millis()).await {
                TickStatus::Running => {}
                TickStatus::Empty => {
                    tracing::debug!(room = %loop_room.code(), "room emptied, stopping ticker");
                    registry.remove_room(&loop_room);
                    break;
                }
                TickStatus::Over => {
                    tracing::info!(
                        room = %loop_room.code(),
                        grace_ms = settings.game_over_grace_ms,
                        "game finished, closing room after grace period"
                    );
                    tokio::time::sleep(settings.game_over_grace()).await;
                    registry.remove_room(&loop_room);
                    break;
                }
            }
        }
        loop_room.mark_stopped();
    });
    room.attach_ticker(handle);
}
