//! Domain layer: value objects, entities and the ports the other layers implement.

pub mod entity;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{
    Participant, PerformancePoint, ProgressUpdate, ROOM_CAPACITY, Room, RoomPhase, RoomSeed,
};
pub use error::{MessagePushError, RepositoryError, RoomError, ValueObjectError};
pub use factory::RoomIdFactory;
pub use message_pusher::{MessagePusher, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use repository::{RoomMutation, RoomRepository};
pub use value_object::{ConnectionId, ParticipantId, RoomId, Timestamp};
