//! UseCase: Room の作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 作成された Room が Lobby から始まり、作成時刻が Clock から取られることを保証
//! - 使用中の ID での作成が拒否されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ID 指定あり / なしでの作成
//! - 異常系：既存の ID での作成

use std::sync::Arc;

use keyrace_shared::time::Clock;

use crate::domain::{RepositoryError, Room, RoomId, RoomRepository, RoomSeed, Timestamp};

use super::error::CreateRoomError;

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Room 作成を実行
    ///
    /// # Arguments
    ///
    /// * `id` - 希望する Room ID（`None` なら採番される）
    /// * `name` - 表示名
    /// * `text` - 入力対象の文章
    pub async fn execute(
        &self,
        id: Option<RoomId>,
        name: String,
        text: String,
    ) -> Result<Room, CreateRoomError> {
        let seed = RoomSeed {
            id,
            name,
            text,
            created_at: Timestamp::new(self.clock.now_millis()),
        };

        self.repository
            .create(seed)
            .await
            .map_err(|RepositoryError::AlreadyExists(id)| CreateRoomError::AlreadyExists(id))
    }
}
