use super::{RoomState, TickOutcome};
use crate::protocol::ServerMessage;
use tokio::sync::mpsc::UnboundedSender;

pub type OutboundSender = UnboundedSender<String>;

#[derive(Debug)]
pub(super) struct SessionEntry {
    pub(super) sender: OutboundSender,
}

impl RoomState {
    pub(super) fn send_to(&self, player_id: &str, message: &ServerMessage) {
        let Some(session) = self.sessions.get(player_id) else { return };
        let Some(payload) = message.to_json() else { return };
        if session.sender.send(payload).is_err() {
            tracing::debug!(room = %self.code, player_id, "dropping message for closed session");
        }
    }

    pub(super) fn broadcast(&self, message: &ServerMessage, except: Option<&str>) {
        if self.sessions.is_empty() {
            return;
        }
        let Some(payload) = message.to_json() else { return };
        for (player_id, session) in &self.sessions {
            if except == Some(player_id.as_str()) {
                continue;
            }
            if session.sender.send(payload.clone()).is_err() {
                tracing::debug!(
                    room = %self.code,
                    player_id = %player_id,
                    "dropping message for closed session"
                );
            }
        }
    }

    /// Delivers a tick's notifications first, then its snapshot.
    pub(super) fn publish(&self, outcome: TickOutcome) {
        for event in outcome.events {
            let recipient = event.recipient().map(str::to_string);
            match recipient {
                Some(player_id) => self.send_to(&player_id, &ServerMessage::from(event)),
                None => self.broadcast(&ServerMessage::from(event), None),
            }
        }
        self.broadcast(&ServerMessage::GameUpdate(outcome.snapshot), None);
    }
}
