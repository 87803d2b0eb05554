//! UseCase: Room 詳細の取得

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Look a room up by the raw id taken from the request path.
    pub async fn execute(&self, room_id: String) -> Result<Room, GetRoomDetailError> {
        let id = RoomId::new(room_id.clone())
            .map_err(|_| GetRoomDetailError::RoomNotFound(room_id.clone()))?;
        self.repository
            .get(&id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound(room_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomSeed, Timestamp},
        infrastructure::{factory::UuidRoomIdFactory, repository::InMemoryRoomRepository},
    };

    async fn create_usecase() -> GetRoomDetailUseCase {
        let repository = Arc::new(InMemoryRoomRepository::new(Arc::new(UuidRoomIdFactory)));
        repository
            .create(RoomSeed {
                id: Some(RoomId::new("R1".to_string()).unwrap()),
                name: "Room 1".to_string(),
                text: "the quick fox".to_string(),
                created_at: Timestamp::new(0),
            })
            .await
            .unwrap();
        GetRoomDetailUseCase::new(repository)
    }

    #[tokio::test]
    async fn test_get_existing_room() {
        // テスト項目: 存在する Room の詳細が取得できる
        // given (前提条件):
        let usecase = create_usecase().await;

        // when (操作):
        let room = usecase.execute("R1".to_string()).await.unwrap();

        // then (期待する結果):
        assert_eq!(room.name, "Room 1");
        assert_eq!(room.text, "the quick fox");
    }

    #[tokio::test]
    async fn test_get_unknown_room() {
        // テスト項目: 存在しない Room・空の ID は RoomNotFound になる
        // given (前提条件):
        let usecase = create_usecase().await;

        // when (操作):
        let unknown = usecase.execute("R9".to_string()).await;
        let blank = usecase.execute("  ".to_string()).await;

        // then (期待する結果):
        assert_eq!(unknown, Err(GetRoomDetailError::RoomNotFound("R9".to_string())));
        assert_eq!(blank, Err(GetRoomDetailError::RoomNotFound("  ".to_string())));
    }
}
