//! UseCase: イベントの配信先の決定と配信
//!
//! 状態遷移の結果（凍結された Room のスナップショット）から配信先の接続を決め、
//! MessagePusher 経由で届けます。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, Room};

/// Who receives an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Only the connection that sent the request.
    Sender,
    /// Everyone in the room except the sender.
    RoomExceptSender,
    /// Everyone in the room, sender included.
    WholeRoom,
}

/// Resolve an audience against a room snapshot.
///
/// Room audiences are empty when there is no room left to address.
pub fn recipients(
    audience: Audience,
    sender: &ConnectionId,
    room: Option<&Room>,
) -> Vec<ConnectionId> {
    match audience {
        Audience::Sender => vec![sender.clone()],
        Audience::RoomExceptSender => room
            .map(|room| {
                room.connection_ids()
                    .into_iter()
                    .filter(|id| id != sender)
                    .collect()
            })
            .unwrap_or_default(),
        Audience::WholeRoom => room.map(Room::connection_ids).unwrap_or_default(),
    }
}

/// イベント配信のユースケース
pub struct BroadcastRouter {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastRouter {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// Deliver one serialized event to an audience.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - the resolved recipients
    /// * `Err(MessagePushError)` - the sender could not be reached
    pub async fn deliver(
        &self,
        audience: Audience,
        sender: &ConnectionId,
        room: Option<&Room>,
        content: &str,
    ) -> Result<Vec<ConnectionId>, MessagePushError> {
        let targets = recipients(audience, sender, room);

        match audience {
            Audience::Sender => self.message_pusher.push_to(sender, content).await?,
            _ if targets.is_empty() => {
                tracing::debug!("No recipients for {:?}, skipping delivery", audience);
            }
            _ => {
                self.message_pusher
                    .broadcast(targets.clone(), content)
                    .await?
            }
        }
        Ok(targets)
    }

    /// Register the outbound channel of a new connection.
    pub async fn attach(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
    }

    /// Forget a closed connection.
    pub async fn detach(&self, connection_id: &ConnectionId) {
        self.message_pusher.unregister_client(connection_id).await;
    }
}
