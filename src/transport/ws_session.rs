use crate::app::time::now_millis;
use crate::control::RoomRegistry;
use crate::game::room::{OutboundSender, Room};
use crate::protocol::{decode_client_message, ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

struct Membership {
    room: Arc<Room>,
    player_id: String,
}

/// Per-connection state: the outbound queue and the room seat, if any.
struct ClientSession {
    registry: Arc<RoomRegistry>,
    outbound: OutboundSender,
    membership: Option<Membership>,
}

pub async fn handle_socket(socket: WebSocket, registry: Arc<RoomRegistry>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let mut session = ClientSession {
        registry,
        outbound: tx,
        membership: None,
    };

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => session.handle_text(&text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    session.leave_current_room().await;
    send_task.abort();
}

impl ClientSession {
    fn reply(&self, message: &ServerMessage) {
        if let Some(payload) = message.to_json() {
            let _ = self.outbound.send(payload);
        }
    }

    async fn handle_text(&mut self, text: &str) {
        let Some(message) = decode_client_message(text) else {
            tracing::debug!(len = text.len(), "ignoring malformed client message");
            self.reply(&ServerMessage::error("invalid message"));
            return;
        };

        match message {
            ClientMessage::CreateRoom { name } => self.create_room(name).await,
            ClientMessage::JoinRoom { room_id, name } => self.join_room(&room_id, name).await,
            ClientMessage::ListRooms => {
                let rooms = self.registry.list_rooms().await;
                self.reply(&ServerMessage::RoomList { rooms });
            }
            ClientMessage::StartGame => {
                let Some(membership) = self.seat() else { return };
                if !self
                    .registry
                    .start_game(&membership.room, &membership.player_id)
                    .await
                {
                    tracing::debug!(
                        room = %membership.room.code(),
                        player_id = %membership.player_id,
                        "start ignored"
                    );
                }
            }
            ClientMessage::SetDirection { direction } => {
                let Some(membership) = self.seat() else { return };
                membership
                    .room
                    .set_direction(&membership.player_id, direction)
                    .await;
            }
            ClientMessage::Shoot => {
                let Some(membership) = self.seat() else { return };
                membership.room.fire(&membership.player_id).await;
            }
            ClientMessage::Dash => {
                let Some(membership) = self.seat() else { return };
                membership
                    .room
                    .activate_dash(&membership.player_id, now_millis())
                    .await;
            }
        }
    }

    fn seat(&self) -> Option<&Membership> {
        if self.membership.is_none() {
            self.reply(&ServerMessage::error("not in a room"));
        }
        self.membership.as_ref()
    }

    async fn create_room(&mut self, name: Option<String>) {
        self.leave_current_room().await;
        match self.registry.create_room(name, self.outbound.clone()).await {
            Ok(created) => {
                self.reply(&ServerMessage::RoomCreated {
                    room_id: created.room.code().to_string(),
                    player_id: created.player_id.clone(),
                });
                self.membership = Some(Membership {
                    room: created.room,
                    player_id: created.player_id,
                });
            }
            Err(error) => {
                tracing::warn!(reason = error.reason(), "room creation failed");
                self.reply(&ServerMessage::error(error.reason()));
            }
        }
    }

    async fn join_room(&mut self, code: &str, name: Option<String>) {
        self.leave_current_room().await;
        match self
            .registry
            .join_room(code, name, self.outbound.clone())
            .await
        {
            Ok((room, accepted)) => {
                self.reply(&ServerMessage::JoinResult {
                    success: true,
                    player_id: Some(accepted.player_id.clone()),
                    players: Some(accepted.players),
                    reason: None,
                });
                self.membership = Some(Membership {
                    room,
                    player_id: accepted.player_id,
                });
            }
            Err(error) => {
                tracing::debug!(room = code, reason = error.reason(), "join rejected");
                self.reply(&ServerMessage::JoinResult {
                    success: false,
                    player_id: None,
                    players: None,
                    reason: Some(error.reason().to_string()),
                });
            }
        }
    }

    async fn leave_current_room(&mut self) {
        if let Some(membership) = self.membership.take() {
            self.registry
                .leave_room(&membership.room, &membership.player_id)
                .await;
        }
    }
}
