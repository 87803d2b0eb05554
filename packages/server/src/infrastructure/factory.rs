//! uuid を使った RoomIdFactory 実装

use crate::domain::{RoomId, RoomIdFactory};

/// Generates v4 uuids as room ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRoomIdFactory;

impl RoomIdFactory for UuidRoomIdFactory {
    fn generate(&self) -> RoomId {
        RoomId::from_uuid(uuid::Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_room_ids() {
        // テスト項目: 生成される RoomId は uuid 形式で毎回異なる
        // given (前提条件):
        let factory = UuidRoomIdFactory;

        // when (操作):
        let first = factory.generate();
        let second = factory.generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(first.as_str()).is_ok());
    }
}
