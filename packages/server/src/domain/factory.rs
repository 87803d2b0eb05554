//! Identifier generation port.

use super::RoomId;

/// Mints ids for rooms created without one.
pub trait RoomIdFactory: Send + Sync {
    fn generate(&self) -> RoomId;
}
