//! Conversion logic between DTOs and domain entities.

use keyrace_shared::time::{rfc3339_to_timestamp, timestamp_to_rfc3339};

use crate::domain::{
    ConnectionId, Participant, ParticipantId, PerformancePoint, Room, RoomId, RoomPhase,
    Timestamp, ValueObjectError,
};
use crate::infrastructure::dto::room as dto;

/// A DTO that cannot be turned into a domain value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidId(#[from] ValueObjectError),

    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },
}

fn parse_timestamp(value: &str) -> Result<Timestamp, ConversionError> {
    rfc3339_to_timestamp(value)
        .map(Timestamp::new)
        .map_err(|source| ConversionError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<Timestamp>, ConversionError> {
    value.map(parse_timestamp).transpose()
}

fn format_timestamp(timestamp: Timestamp) -> String {
    timestamp_to_rfc3339(timestamp.value())
}

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::RoomPhaseDto> for RoomPhase {
    fn from(dto: dto::RoomPhaseDto) -> Self {
        match dto {
            dto::RoomPhaseDto::Lobby => Self::Lobby,
            dto::RoomPhaseDto::Active => Self::Active,
            dto::RoomPhaseDto::Finished => Self::Finished,
        }
    }
}

impl From<dto::PerformancePointDto> for PerformancePoint {
    fn from(dto: dto::PerformancePointDto) -> Self {
        Self {
            time_remaining: dto.time_remaining,
            wpm: dto.wpm,
            accuracy: dto.accuracy,
            error: dto.error,
            word_count: dto.word_count,
            character_count: dto.character_count,
        }
    }
}

impl TryFrom<dto::ParticipantDto> for Participant {
    type Error = ConversionError;

    fn try_from(dto: dto::ParticipantDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ParticipantId::new(dto.id)?,
            name: dto.name,
            connection_id: dto.connection_id.map(ConnectionId::new).transpose()?,
            is_ready: dto.is_ready,
            input: dto.input,
            is_done: dto.is_done,
            wpm: dto.wpm,
            done_at: parse_optional_timestamp(dto.done_at.as_deref())?,
            is_owner: dto.is_owner,
            performance_data: dto.performance_data.into_iter().map(Into::into).collect(),
        })
    }
}

impl TryFrom<dto::RoomDto> for Room {
    type Error = ConversionError;

    fn try_from(dto: dto::RoomDto) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RoomId::new(dto.id)?,
            name: dto.name,
            participants: dto
                .participants
                .into_iter()
                .map(Participant::try_from)
                .collect::<Result<_, _>>()?,
            phase: dto.phase.into(),
            text: dto.text,
            created_at: parse_timestamp(&dto.created_at)?,
            started_at: parse_optional_timestamp(dto.started_at.as_deref())?,
            finished_at: parse_optional_timestamp(dto.finished_at.as_deref())?,
            total_time: dto.total_time,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<RoomPhase> for dto::RoomPhaseDto {
    fn from(phase: RoomPhase) -> Self {
        match phase {
            RoomPhase::Lobby => Self::Lobby,
            RoomPhase::Active => Self::Active,
            RoomPhase::Finished => Self::Finished,
        }
    }
}

impl From<PerformancePoint> for dto::PerformancePointDto {
    fn from(model: PerformancePoint) -> Self {
        Self {
            time_remaining: model.time_remaining,
            wpm: model.wpm,
            accuracy: model.accuracy,
            error: model.error,
            word_count: model.word_count,
            character_count: model.character_count,
        }
    }
}

impl From<Participant> for dto::ParticipantDto {
    fn from(model: Participant) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
            connection_id: model.connection_id.map(ConnectionId::into_string),
            is_ready: model.is_ready,
            input: model.input,
            is_done: model.is_done,
            wpm: model.wpm,
            done_at: model.done_at.map(format_timestamp),
            is_owner: model.is_owner,
            performance_data: model.performance_data.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Room> for dto::RoomDto {
    fn from(model: Room) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name,
            participants: model.participants.into_iter().map(Into::into).collect(),
            phase: model.phase.into(),
            text: model.text,
            created_at: format_timestamp(model.created_at),
            started_at: model.started_at.map(format_timestamp),
            finished_at: model.finished_at.map(format_timestamp),
            total_time: model.total_time,
        }
    }
}
