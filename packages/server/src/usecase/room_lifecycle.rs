//! UseCase: Room のライフサイクル（レースの状態遷移）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - join / leave / release / set_ready / update_progress / update_shared_text / replace_room
//! - Lobby → Active → Finished の遷移が一度だけ起きること
//!
//! ### なぜこのテストが必要か
//! - 同じ Room への同時操作でも定員・オーナー・フェーズの不変条件が崩れないことを保証
//! - 最後の参加者の退出で Room が削除されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人でのレース開始から終了まで
//! - 異常系：存在しない Room / 参加者、満員の Room
//! - エッジケース：再接続後の古い接続の切断、同時の ready

use std::sync::Arc;

use keyrace_shared::time::Clock;

use crate::domain::{
    ConnectionId, Participant, ParticipantId, ProgressUpdate, ROOM_CAPACITY, Room, RoomError,
    RoomId, RoomPhase, RoomRepository, Timestamp,
};

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub room: Room,
    /// The participant as stored after the join.
    pub participant: Participant,
}

/// Result of a participant leaving.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    /// The room still has participants.
    Remaining(Room),
    /// The room emptied and was deleted.
    RoomGone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyOutcome {
    pub room: Room,
    /// This call moved the room from Lobby to Active.
    pub race_started: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressOutcome {
    pub room: Room,
    /// This call moved the room from Active to Finished.
    pub race_finished: bool,
}

/// The room state machine.
///
/// Each operation is a single atomic transition on one room. Only snapshots
/// leave this type.
pub struct RoomLifecycle {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl RoomLifecycle {
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// Add a participant to a room, or re-attach it under a new connection.
    pub async fn join(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<JoinOutcome, RoomError> {
        let participant_id = participant.id.clone();
        let room = self
            .repository
            .modify(
                room_id,
                Box::new(move |room: &mut Room| room.join(participant).map(|_| ())),
            )
            .await?;

        let participant = room
            .participant(&participant_id)
            .cloned()
            .ok_or_else(|| {
                RoomError::InternalFailure(format!(
                    "participant {participant_id} missing from room {room_id} after join"
                ))
            })?;
        tracing::info!(
            "Participant '{}' joined room '{}' ({}/{})",
            participant_id,
            room_id,
            room.participants.len(),
            ROOM_CAPACITY
        );
        Ok(JoinOutcome { room, participant })
    }

    /// Remove a participant. Removing someone who is not there is a no-op.
    pub async fn leave(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<LeaveOutcome, RoomError> {
        let room = self
            .repository
            .modify(
                room_id,
                Box::new(|room: &mut Room| {
                    room.remove_participant(participant_id);
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Participant '{}' left room '{}'", participant_id, room_id);
        Ok(self.settle_departure(room).await)
    }

    /// Remove a participant on connection loss.
    ///
    /// Nothing happens when the participant has since rejoined under another
    /// connection; `Ok(None)` reports that.
    pub async fn release(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        connection_id: &ConnectionId,
    ) -> Result<Option<LeaveOutcome>, RoomError> {
        let mut released = false;
        let room = self
            .repository
            .modify(
                room_id,
                Box::new(|room: &mut Room| {
                    released = room.release_connection(participant_id, connection_id);
                    Ok(())
                }),
            )
            .await?;

        if !released {
            return Ok(None);
        }
        tracing::info!(
            "Participant '{}' released from room '{}' after disconnect",
            participant_id,
            room_id
        );
        Ok(Some(self.settle_departure(room).await))
    }

    async fn settle_departure(&self, room: Room) -> LeaveOutcome {
        if room.is_empty() && self.repository.delete_if_empty(&room.id).await {
            return LeaveOutcome::RoomGone;
        }
        LeaveOutcome::Remaining(room)
    }

    /// Set a participant's readiness; starts the race when everyone is ready.
    pub async fn set_ready(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        ready: bool,
    ) -> Result<ReadyOutcome, RoomError> {
        let now = self.now();
        let mut race_started = false;
        let room = self
            .repository
            .modify(
                room_id,
                Box::new(|room: &mut Room| {
                    race_started = room.set_ready(participant_id, ready, now)?;
                    Ok(())
                }),
            )
            .await?;

        if race_started {
            tracing::info!("Race started in room '{}'", room_id);
        }
        Ok(ReadyOutcome { room, race_started })
    }

    /// Record typing progress; finishes the race when everyone is done.
    pub async fn update_progress(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        update: ProgressUpdate,
    ) -> Result<ProgressOutcome, RoomError> {
        let now = self.now();
        let mut race_finished = false;
        let room = self
            .repository
            .modify(
                room_id,
                Box::new(|room: &mut Room| {
                    race_finished = room.update_progress(participant_id, update, now)?;
                    Ok(())
                }),
            )
            .await?;

        if race_finished {
            tracing::info!(
                "Race finished in room '{}' after {} ms",
                room_id,
                room.total_time
            );
        }
        Ok(ProgressOutcome {
            room,
            race_finished,
        })
    }

    /// Replace the passage to type. Allowed in every phase.
    pub async fn update_shared_text(&self, room_id: &RoomId, text: String) -> Result<Room, RoomError> {
        self.repository
            .modify(
                room_id,
                Box::new(move |room: &mut Room| {
                    room.text = text;
                    Ok(())
                }),
            )
            .await
    }

    /// Whole-room overwrite, last writer wins.
    ///
    /// Still refuses rooms over capacity and a finished race moving back.
    /// The phase check and the overwrite happen under the same room lock. A
    /// replacement that empties a populated room deletes it, and the emptied
    /// snapshot is returned.
    pub async fn replace_room(&self, replacement: Room) -> Result<Room, RoomError> {
        if replacement.participants.len() > ROOM_CAPACITY {
            return Err(RoomError::RoomFull(replacement.id));
        }

        let room_id = replacement.id.clone();
        let mut emptied = false;
        let room = self
            .repository
            .modify(
                &room_id,
                Box::new(|room: &mut Room| {
                    if room.phase == RoomPhase::Finished
                        && replacement.phase != RoomPhase::Finished
                    {
                        return Err(RoomError::InvalidTransition(format!(
                            "room {} is finished and cannot return to {:?}",
                            room.id, replacement.phase
                        )));
                    }
                    emptied =
                        !room.participants.is_empty() && replacement.participants.is_empty();
                    *room = replacement;
                    Ok(())
                }),
            )
            .await?;

        if emptied && self.repository.delete_if_empty(&room_id).await {
            tracing::info!("Room '{}' emptied by replacement and deleted", room_id);
        }
        Ok(room)
    }
}
