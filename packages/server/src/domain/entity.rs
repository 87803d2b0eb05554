//! Domain entities: Room and Participant.
//!
//! The race state machine lives on [`Room`]. Every transition is a plain
//! method on `&mut Room`, so the rules can be tested without any locking or
//! I/O; the repository decides how the mutation is made atomic.

use super::{
    error::RoomError,
    value_object::{ConnectionId, ParticipantId, RoomId, Timestamp},
};

/// Maximum number of participants in one room.
pub const ROOM_CAPACITY: usize = 3;

/// Race phase of a room. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomPhase {
    #[default]
    Lobby,
    Active,
    Finished,
}

/// One timed sample of a participant's typing performance.
///
/// Written by the client and stored as-is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerformancePoint {
    pub time_remaining: f64,
    pub wpm: f64,
    pub accuracy: f64,
    pub error: f64,
    pub word_count: u32,
    pub character_count: u32,
}

/// A participant inside one room.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Live connection currently speaking for this participant.
    pub connection_id: Option<ConnectionId>,
    pub is_ready: bool,
    pub input: String,
    pub is_done: bool,
    pub wpm: f64,
    pub done_at: Option<Timestamp>,
    pub is_owner: bool,
    pub performance_data: Vec<PerformancePoint>,
}

impl Participant {
    /// Create a participant in its pre-race state.
    pub fn new(id: ParticipantId, name: String, connection_id: ConnectionId) -> Self {
        Self {
            id,
            name,
            connection_id: Some(connection_id),
            is_ready: false,
            input: String::new(),
            is_done: false,
            wpm: 0.0,
            done_at: None,
            is_owner: false,
            performance_data: Vec::new(),
        }
    }
}

/// Values accepted by a progress update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressUpdate {
    pub input: String,
    pub wpm: f64,
    pub is_done: bool,
    pub sample: Option<PerformancePoint>,
}

/// Fields a caller may choose when creating a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSeed {
    pub id: Option<RoomId>,
    pub name: String,
    pub text: String,
    pub created_at: Timestamp,
}

/// A typing-race room.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    /// Join order is preserved.
    pub participants: Vec<Participant>,
    pub phase: RoomPhase,
    pub text: String,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    /// Race duration in milliseconds, set when the race finishes.
    pub total_time: i64,
}

impl Room {
    /// Create an empty room in the lobby.
    pub fn new(id: RoomId, name: String, text: String, created_at: Timestamp) -> Self {
        Self {
            id,
            name,
            participants: Vec::new(),
            phase: RoomPhase::Lobby,
            text,
            created_at,
            started_at: None,
            finished_at: None,
            total_time: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    fn participant_mut(&mut self, id: &ParticipantId) -> Result<&mut Participant, RoomError> {
        self.participants
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| RoomError::ParticipantNotFound(id.clone()))
    }

    /// Connections of every participant currently attached to a live socket.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.participants
            .iter()
            .filter_map(|p| p.connection_id.clone())
            .collect()
    }

    /// Add a participant, or re-attach an existing one to a new connection.
    ///
    /// A full room rejects the request before the rejoin check, so a room at
    /// capacity is never touched by a join.
    pub fn join(&mut self, mut participant: Participant) -> Result<Participant, RoomError> {
        if self.participants.len() >= ROOM_CAPACITY {
            return Err(RoomError::RoomFull(self.id.clone()));
        }

        if let Some(existing) = self.participants.iter_mut().find(|p| p.id == participant.id) {
            existing.connection_id = participant.connection_id;
            return Ok(existing.clone());
        }

        participant.is_owner = self.participants.is_empty();
        self.participants.push(participant.clone());
        Ok(participant)
    }

    /// Remove a participant. Returns whether anyone was removed.
    ///
    /// Ownership stays where it was: when the owner leaves, nobody inherits it.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| &p.id != id);
        self.participants.len() != before
    }

    /// Remove a participant only while `connection_id` still speaks for it.
    pub fn release_connection(&mut self, id: &ParticipantId, connection_id: &ConnectionId) -> bool {
        let attached = self
            .participant(id)
            .is_some_and(|p| p.connection_id.as_ref() == Some(connection_id));
        attached && self.remove_participant(id)
    }

    /// Set readiness and start the race once everyone is ready.
    ///
    /// Returns `true` only for the call that moved the room to `Active`.
    pub fn set_ready(
        &mut self,
        id: &ParticipantId,
        ready: bool,
        now: Timestamp,
    ) -> Result<bool, RoomError> {
        self.participant_mut(id)?.is_ready = ready;

        if self.phase == RoomPhase::Lobby && self.everyone(|p| p.is_ready) {
            self.phase = RoomPhase::Active;
            self.started_at = Some(now);
            return Ok(true);
        }
        Ok(false)
    }

    /// Record typing progress and finish the race once everyone is done.
    ///
    /// The finish check runs on every done report, not only the first one per
    /// participant, so a room whose players were all done before it went
    /// `Active` finishes on the next report. Returns `true` only for the call
    /// that moved the room to `Finished`.
    pub fn update_progress(
        &mut self,
        id: &ParticipantId,
        update: ProgressUpdate,
        now: Timestamp,
    ) -> Result<bool, RoomError> {
        let participant = self.participant_mut(id)?;
        participant.input = update.input;
        participant.wpm = update.wpm;
        if let Some(sample) = update.sample {
            participant.performance_data.push(sample);
        }
        if !update.is_done {
            return Ok(false);
        }
        if !participant.is_done {
            participant.is_done = true;
            participant.done_at = Some(now);
        }

        if self.phase == RoomPhase::Active && self.everyone(|p| p.is_done) {
            self.phase = RoomPhase::Finished;
            self.finished_at = Some(now);
            self.total_time = self
                .started_at
                .map(|started| now.millis_since(started))
                .unwrap_or_default();
            return Ok(true);
        }
        Ok(false)
    }

    /// A lone participant never satisfies a room-wide condition.
    fn everyone(&self, predicate: impl Fn(&Participant) -> bool) -> bool {
        self.participants.len() > 1 && self.participants.iter().all(predicate)
    }
}
