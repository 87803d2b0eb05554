//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::RoomId;

/// Room 作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    /// The requested id is taken by a live room
    #[error("Room '{0}' already exists")]
    AlreadyExists(RoomId),
}

/// Room 詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}
