//! UseCase: Room 一覧の取得

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// All live rooms, oldest first.
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.list().await
    }
}
