//! Domain errors.

use super::value_object::{ParticipantId, RoomId};

/// Failures of a room transition.
///
/// Kinds are for logs and tests; the session gateway turns them into short
/// display messages before anything reaches a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("room {0} is full")]
    RoomFull(RoomId),

    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    /// The room's phase does not allow the requested change.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("internal failure: {0}")]
    InternalFailure(String),
}

/// Failures of the room store itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),
}

/// Failures when pushing an outbound frame to a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessagePushError {
    #[error("connection {0} not found")]
    ConnectionNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}

/// Validation failures of value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}
