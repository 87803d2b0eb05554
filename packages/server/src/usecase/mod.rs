//! UseCase 層: ドメインモデルを組み合わせたアプリケーションの操作

pub mod broadcast_router;
pub mod create_room;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod room_lifecycle;

pub use broadcast_router::{Audience, BroadcastRouter};
pub use create_room::CreateRoomUseCase;
pub use error::{CreateRoomError, GetRoomDetailError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use room_lifecycle::{JoinOutcome, LeaveOutcome, ProgressOutcome, ReadyOutcome, RoomLifecycle};
