//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Room, RoomError, RoomId, RoomSeed, error::RepositoryError};

/// A transition applied to one room under that room's exclusive lock.
pub type RoomMutation<'a> = Box<dyn FnOnce(&mut Room) -> Result<(), RoomError> + Send + 'a>;

/// Room Repository trait
///
/// The authoritative keyed store of rooms. It knows nothing about capacity or
/// phases; those rules belong to [`Room`] and the lifecycle use case.
///
/// Every method hands out snapshots. No caller ever holds a reference into
/// the store beyond a single call.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Store a new room, assigning an id when the seed has none.
    async fn create(&self, seed: RoomSeed) -> Result<Room, RepositoryError>;

    async fn get(&self, id: &RoomId) -> Option<Room>;

    /// All rooms in insertion order.
    async fn list(&self) -> Vec<Room>;

    /// Overwrite an existing room. Never creates one.
    async fn replace(&self, room: Room) -> Option<Room>;

    /// Delete the room if it has no participants. Returns whether it was deleted.
    async fn delete_if_empty(&self, id: &RoomId) -> bool;

    /// Atomic read-modify-write of one room.
    ///
    /// The mutation runs on a draft; the draft is committed only when the
    /// mutation succeeds. Returns the committed snapshot.
    async fn modify(&self, id: &RoomId, mutation: RoomMutation<'_>) -> Result<Room, RoomError>;
}
