//! Session gateway: one WebSocket connection's view of the room system.
//!
//! ## 責務
//!
//! - 接続ごとの (Room, 参加者) の紐付けを管理
//! - 受信イベントを RoomLifecycle の操作に変換
//! - 結果を BroadcastRouter で適切な配信先に届ける
//! - 失敗を送信者だけに届く `*_error` イベントに変換
//!
//! 接続が切れた場合は紐付いている参加者を即座に Room から外します（猶予期間なし）。

use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, Participant, ParticipantId, PerformancePoint, ProgressUpdate, PusherChannel,
        Room, RoomError, RoomId, ValueObjectError,
    },
    infrastructure::dto::{
        conversion::ConversionError,
        room::RoomDto,
        websocket::{ClientEvent, JoinParticipantDto, ServerEvent},
    },
    usecase::{Audience, BroadcastRouter, LeaveOutcome, RoomLifecycle},
};

/// The room seat a connection currently speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    room_id: RoomId,
    participant_id: ParticipantId,
}

/// Why a client request was refused.
#[derive(Debug, Error)]
enum GatewayError {
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("invalid request: {0}")]
    InvalidInput(String),
}

impl From<ValueObjectError> for GatewayError {
    fn from(err: ValueObjectError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<ConversionError> for GatewayError {
    fn from(err: ConversionError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl GatewayError {
    /// Short text shown to the user. Never the error kind itself.
    fn display_message(&self) -> &'static str {
        match self {
            Self::Room(RoomError::RoomNotFound(_)) => "Room not found",
            Self::Room(RoomError::RoomFull(_)) => "Room is full",
            Self::Room(RoomError::ParticipantNotFound(_)) => "You are not in this room",
            Self::Room(RoomError::InvalidTransition(_)) => "This change is not allowed now",
            Self::Room(RoomError::InternalFailure(_)) => "Something went wrong",
            Self::InvalidInput(_) => "Invalid request",
        }
    }

    fn log(&self, connection_id: &ConnectionId, event: &str) {
        match self {
            Self::Room(RoomError::InternalFailure(_)) => {
                tracing::error!("'{}' from '{}' failed: {}", event, connection_id, self);
            }
            _ => tracing::warn!("'{}' from '{}' rejected: {}", event, connection_id, self),
        }
    }
}

/// Routes the events of every live connection.
pub struct SessionGateway {
    lifecycle: Arc<RoomLifecycle>,
    router: Arc<BroadcastRouter>,
    sessions: Mutex<HashMap<ConnectionId, Option<Binding>>>,
}

impl SessionGateway {
    pub fn new(lifecycle: Arc<RoomLifecycle>, router: Arc<BroadcastRouter>) -> Self {
        Self {
            lifecycle,
            router,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start tracking a freshly opened connection.
    pub async fn connect(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.router.attach(connection_id.clone(), sender).await;
        self.sessions.lock().await.insert(connection_id.clone(), None);
        tracing::info!("Connection '{}' opened", connection_id);
    }

    /// Handle one inbound text frame. Unparseable frames are logged and dropped.
    pub async fn handle_frame(&self, connection_id: &ConnectionId, frame: &str) {
        match serde_json::from_str::<ClientEvent>(frame) {
            Ok(event) => self.handle(connection_id, event).await,
            Err(e) => tracing::warn!("Ignoring unparseable frame from '{}': {}", connection_id, e),
        }
    }

    pub async fn handle(&self, connection_id: &ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Join {
                room_id,
                participant,
            } => self.on_join(connection_id, room_id, participant).await,
            ClientEvent::Leave {
                room_id,
                participant_id,
            } => self.on_leave(connection_id, room_id, participant_id).await,
            ClientEvent::Ready {
                room_id,
                participant_id,
            } => self.on_ready(connection_id, room_id, participant_id).await,
            ClientEvent::Update { room } => self.on_update(connection_id, room).await,
            ClientEvent::UpdateText { room_id, text } => {
                self.on_update_text(connection_id, room_id, text).await
            }
            ClientEvent::Progress {
                room_id,
                participant_id,
                input,
                wpm,
                is_done,
                performance,
            } => {
                let update = ProgressUpdate {
                    input,
                    wpm,
                    is_done,
                    sample: performance.map(PerformancePoint::from),
                };
                self.on_progress(connection_id, room_id, participant_id, update)
                    .await
            }
        }
    }

    /// Tear down a closed connection, releasing its seat if it still holds one.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let binding = self.sessions.lock().await.remove(connection_id).flatten();

        if let Some(binding) = binding {
            self.release(connection_id, binding).await;
        }

        self.router.detach(connection_id).await;
        tracing::info!("Connection '{}' closed", connection_id);
    }

    async fn on_join(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
        participant: JoinParticipantDto,
    ) {
        let result = async {
            let room_id = RoomId::new(room_id)?;
            let participant_id = ParticipantId::new(participant.id)?;
            let wanted = Binding {
                room_id: room_id.clone(),
                participant_id: participant_id.clone(),
            };

            let joiner = Participant::new(participant_id, participant.name, connection_id.clone());
            let outcome = self.lifecycle.join(&room_id, joiner).await?;

            // The previous seat is kept until the new one is secured.
            let previous = self.binding(connection_id).await;
            self.set_binding(connection_id, Some(wanted.clone())).await;
            if let Some(previous) = previous.filter(|previous| previous != &wanted) {
                self.release(connection_id, previous).await;
            }
            Ok::<_, GatewayError>(outcome)
        }
        .await;

        match result {
            Ok(outcome) => {
                let room_dto = RoomDto::from(outcome.room.clone());
                self.send(
                    Audience::Sender,
                    connection_id,
                    Some(&outcome.room),
                    ServerEvent::Joined {
                        room: room_dto.clone(),
                    },
                )
                .await;
                self.send(
                    Audience::RoomExceptSender,
                    connection_id,
                    Some(&outcome.room),
                    ServerEvent::UserJoined {
                        room: room_dto,
                        participant: outcome.participant.into(),
                    },
                )
                .await;
            }
            Err(e) => {
                e.log(connection_id, "room:join");
                let message = e.display_message().to_string();
                self.send(Audience::Sender, connection_id, None, ServerEvent::JoinError { message })
                    .await;
            }
        }
    }

    async fn on_leave(&self, connection_id: &ConnectionId, room_id: String, participant_id: String) {
        let result = async {
            let room_id = RoomId::new(room_id)?;
            let participant_id = ParticipantId::new(participant_id)?;

            let outcome = match self.lifecycle.leave(&room_id, &participant_id).await {
                // Leaving a room that no longer exists is already done.
                Err(RoomError::RoomNotFound(_)) => LeaveOutcome::RoomGone,
                other => other?,
            };

            let mut sessions = self.sessions.lock().await;
            if let Some(slot) = sessions.get_mut(connection_id)
                && slot.as_ref().is_some_and(|b| b.room_id == room_id)
            {
                *slot = None;
            }
            Ok::<_, GatewayError>((room_id, participant_id, outcome))
        }
        .await;

        match result {
            Ok((room_id, participant_id, outcome)) => {
                self.send(
                    Audience::Sender,
                    connection_id,
                    None,
                    ServerEvent::Left {
                        room_id: room_id.into_string(),
                    },
                )
                .await;
                if let LeaveOutcome::Remaining(room) = outcome {
                    self.announce_departure(connection_id, &room, participant_id)
                        .await;
                }
            }
            Err(e) => {
                e.log(connection_id, "room:leave");
                let message = e.display_message().to_string();
                self.send(Audience::Sender, connection_id, None, ServerEvent::LeaveError { message })
                    .await;
            }
        }
    }

    async fn on_ready(&self, connection_id: &ConnectionId, room_id: String, participant_id: String) {
        let result = async {
            let room_id = RoomId::new(room_id)?;
            let participant_id = ParticipantId::new(participant_id)?;
            let outcome = self
                .lifecycle
                .set_ready(&room_id, &participant_id, true)
                .await?;
            Ok::<_, GatewayError>((participant_id, outcome))
        }
        .await;

        match result {
            Ok((participant_id, outcome)) => {
                let room_dto = RoomDto::from(outcome.room.clone());
                self.send(
                    Audience::WholeRoom,
                    connection_id,
                    Some(&outcome.room),
                    ServerEvent::UserReady {
                        room: room_dto.clone(),
                        participant_id: participant_id.into_string(),
                    },
                )
                .await;
                if outcome.race_started {
                    self.send(
                        Audience::WholeRoom,
                        connection_id,
                        Some(&outcome.room),
                        ServerEvent::RaceStart { room: room_dto },
                    )
                    .await;
                }
            }
            Err(e) => {
                e.log(connection_id, "room:ready");
                let message = e.display_message().to_string();
                self.send(Audience::Sender, connection_id, None, ServerEvent::ReadyError { message })
                    .await;
            }
        }
    }

    async fn on_update(&self, connection_id: &ConnectionId, room: RoomDto) {
        let result = async {
            let room = Room::try_from(room)?;
            Ok::<_, GatewayError>(self.lifecycle.replace_room(room).await?)
        }
        .await;

        match result {
            Ok(room) => self.send_room_data(connection_id, room).await,
            Err(e) => {
                e.log(connection_id, "room:update");
                let message = e.display_message().to_string();
                self.send(Audience::Sender, connection_id, None, ServerEvent::UpdateError { message })
                    .await;
            }
        }
    }

    async fn on_update_text(&self, connection_id: &ConnectionId, room_id: String, text: String) {
        let result = async {
            let room_id = RoomId::new(room_id)?;
            Ok::<_, GatewayError>(self.lifecycle.update_shared_text(&room_id, text).await?)
        }
        .await;

        match result {
            Ok(room) => self.send_room_data(connection_id, room).await,
            Err(e) => {
                e.log(connection_id, "room:update_text");
                let message = e.display_message().to_string();
                self.send(
                    Audience::Sender,
                    connection_id,
                    None,
                    ServerEvent::UpdateTextError { message },
                )
                .await;
            }
        }
    }

    async fn on_progress(
        &self,
        connection_id: &ConnectionId,
        room_id: String,
        participant_id: String,
        update: ProgressUpdate,
    ) {
        let result = async {
            let room_id = RoomId::new(room_id)?;
            let participant_id = ParticipantId::new(participant_id)?;
            let outcome = self
                .lifecycle
                .update_progress(&room_id, &participant_id, update)
                .await?;
            Ok::<_, GatewayError>(outcome)
        }
        .await;

        match result {
            Ok(outcome) => {
                self.send(
                    Audience::RoomExceptSender,
                    connection_id,
                    Some(&outcome.room),
                    ServerEvent::UserProgress {
                        room: outcome.room.clone().into(),
                    },
                )
                .await;
            }
            Err(e) => {
                e.log(connection_id, "typing:progress");
                let message = e.display_message().to_string();
                self.send(
                    Audience::Sender,
                    connection_id,
                    None,
                    ServerEvent::ProgressError { message },
                )
                .await;
            }
        }
    }

    /// Drop a seat held by this connection and tell whoever is left.
    async fn release(&self, connection_id: &ConnectionId, binding: Binding) {
        match self
            .lifecycle
            .release(&binding.room_id, &binding.participant_id, connection_id)
            .await
        {
            Ok(Some(LeaveOutcome::Remaining(room))) => {
                self.announce_departure(connection_id, &room, binding.participant_id)
                    .await;
            }
            Ok(Some(LeaveOutcome::RoomGone)) | Ok(None) => {}
            Err(RoomError::RoomNotFound(_)) => {
                tracing::debug!("Room '{}' already gone", binding.room_id);
            }
            Err(e) => tracing::error!(
                "Failed to release '{}' from room '{}': {}",
                binding.participant_id,
                binding.room_id,
                e
            ),
        }
    }

    async fn announce_departure(
        &self,
        connection_id: &ConnectionId,
        room: &Room,
        participant_id: ParticipantId,
    ) {
        self.send(
            Audience::RoomExceptSender,
            connection_id,
            Some(room),
            ServerEvent::UserLeft {
                room: room.clone().into(),
                participant_id: participant_id.into_string(),
            },
        )
        .await;
    }

    async fn send_room_data(&self, connection_id: &ConnectionId, room: Room) {
        let event = ServerEvent::UpdateData {
            room: room.clone().into(),
        };
        let sender_seated = room.connection_ids().contains(connection_id);
        self.send(Audience::WholeRoom, connection_id, Some(&room), event.clone())
            .await;
        if !sender_seated {
            self.send(Audience::Sender, connection_id, Some(&room), event)
                .await;
        }
    }

    /// Serialize once, then deliver. Delivery failures are logged only.
    async fn send(
        &self,
        audience: Audience,
        connection_id: &ConnectionId,
        room: Option<&Room>,
        event: ServerEvent,
    ) {
        let name = event.name();
        let content = match serde_json::to_string(&event) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to serialize '{}': {}", name, e);
                return;
            }
        };

        match self
            .router
            .deliver(audience, connection_id, room, &content)
            .await
        {
            Ok(targets) => tracing::debug!("Delivered '{}' to {} connection(s)", name, targets.len()),
            Err(e) => tracing::warn!("Failed to deliver '{}': {}", name, e),
        }
    }

    async fn binding(&self, connection_id: &ConnectionId) -> Option<Binding> {
        self.sessions
            .lock()
            .await
            .get(connection_id)
            .cloned()
            .flatten()
    }

    async fn set_binding(&self, connection_id: &ConnectionId, binding: Option<Binding>) {
        if let Some(slot) = self.sessions.lock().await.get_mut(connection_id) {
            *slot = binding;
        }
    }
}
