//! WebSocket event envelopes.
//!
//! Every frame is `{"event": "<name>", "data": {...}}`. Event names and field
//! names are the wire contract shared with the browser client.

use serde::{Deserialize, Serialize};

use super::room::{ParticipantDto, PerformancePointDto, RoomDto};

/// Participant fields a client supplies when joining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinParticipantDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    #[serde(rename = "room:join")]
    Join {
        room_id: String,
        participant: JoinParticipantDto,
    },
    #[serde(rename = "room:leave")]
    Leave {
        room_id: String,
        participant_id: String,
    },
    #[serde(rename = "room:ready")]
    Ready {
        room_id: String,
        participant_id: String,
    },
    #[serde(rename = "room:update")]
    Update { room: RoomDto },
    #[serde(rename = "room:update_text")]
    UpdateText { room_id: String, text: String },
    #[serde(rename = "typing:progress")]
    Progress {
        room_id: String,
        participant_id: String,
        input: String,
        #[serde(default)]
        wpm: f64,
        #[serde(default)]
        is_done: bool,
        #[serde(default)]
        performance: Option<PerformancePointDto>,
    },
}

/// Events sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    #[serde(rename = "room:joined")]
    Joined { room: RoomDto },
    #[serde(rename = "room:user_joined")]
    UserJoined {
        room: RoomDto,
        participant: ParticipantDto,
    },
    #[serde(rename = "room:join_error")]
    JoinError { message: String },

    #[serde(rename = "room:left")]
    Left { room_id: String },
    #[serde(rename = "room:user_left")]
    UserLeft {
        room: RoomDto,
        participant_id: String,
    },
    #[serde(rename = "room:leave_error")]
    LeaveError { message: String },

    #[serde(rename = "room:user_ready")]
    UserReady {
        room: RoomDto,
        participant_id: String,
    },
    #[serde(rename = "room:race_start")]
    RaceStart { room: RoomDto },
    #[serde(rename = "room:ready_error")]
    ReadyError { message: String },

    #[serde(rename = "room:update_data")]
    UpdateData { room: RoomDto },
    #[serde(rename = "room:update_error")]
    UpdateError { message: String },
    #[serde(rename = "room:update_text_error")]
    UpdateTextError { message: String },

    #[serde(rename = "typing:user_progress")]
    UserProgress { room: RoomDto },
    #[serde(rename = "typing:progress_error")]
    ProgressError { message: String },
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "room:joined",
            Self::UserJoined { .. } => "room:user_joined",
            Self::JoinError { .. } => "room:join_error",
            Self::Left { .. } => "room:left",
            Self::UserLeft { .. } => "room:user_left",
            Self::LeaveError { .. } => "room:leave_error",
            Self::UserReady { .. } => "room:user_ready",
            Self::RaceStart { .. } => "room:race_start",
            Self::ReadyError { .. } => "room:ready_error",
            Self::UpdateData { .. } => "room:update_data",
            Self::UpdateError { .. } => "room:update_error",
            Self::UpdateTextError { .. } => "room:update_text_error",
            Self::UserProgress { .. } => "typing:user_progress",
            Self::ProgressError { .. } => "typing:progress_error",
        }
    }
}
