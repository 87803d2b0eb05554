//! Server state shared by every handler.

use std::{sync::Arc, time::Instant};

use keyrace_shared::time::Clock;

use crate::usecase::{CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase};

use super::gateway::SessionGateway;

/// Shared application state
pub struct AppState {
    /// SessionGateway（WebSocket 接続ごとのイベント処理）
    pub gateway: Arc<SessionGateway>,
    /// CreateRoomUseCase（Room 作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（Room 詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub clock: Arc<dyn Clock>,
    /// Process start, for the health endpoint's uptime.
    pub started_at: Instant,
}
