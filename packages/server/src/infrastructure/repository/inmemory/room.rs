//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロックの粒度
//!
//! - テーブル全体: `RwLock`（Room の追加・削除時のみ書き込みロック）
//! - Room ごと: `Mutex`（遷移は Room 単位で直列化）
//!
//! 遷移はテーブルの読み込みロックと対象 Room の `Mutex` を保持したまま実行されるため、
//! 異なる Room への操作は互いにブロックしません。
//! `delete_if_empty` は書き込みロックを取得してから空であることを再確認するので、
//! 最後の退出と同時に来た参加は「削除前に参加する」か「RoomNotFound になる」かのどちらかです。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    RepositoryError, Room, RoomError, RoomId, RoomIdFactory, RoomMutation, RoomRepository,
    RoomSeed,
};

#[derive(Default)]
struct RoomTable {
    entries: HashMap<RoomId, Arc<Mutex<Room>>>,
    /// Insertion order of `entries`.
    order: Vec<RoomId>,
}

/// インメモリ Room Repository 実装
///
/// Room ドメインモデルを保持し、ドメイン層の RoomRepository trait を実装します（依存性の逆転）。
pub struct InMemoryRoomRepository {
    table: RwLock<RoomTable>,
    id_factory: Arc<dyn RoomIdFactory>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(id_factory: Arc<dyn RoomIdFactory>) -> Self {
        Self {
            table: RwLock::new(RoomTable::default()),
            id_factory,
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, seed: RoomSeed) -> Result<Room, RepositoryError> {
        let id = seed.id.unwrap_or_else(|| self.id_factory.generate());

        let mut table = self.table.write().await;
        if table.entries.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(id));
        }

        let room = Room::new(id.clone(), seed.name, seed.text, seed.created_at);
        table
            .entries
            .insert(id.clone(), Arc::new(Mutex::new(room.clone())));
        table.order.push(id);

        tracing::info!("Room '{}' created", room.id);
        Ok(room)
    }

    async fn get(&self, id: &RoomId) -> Option<Room> {
        let table = self.table.read().await;
        let entry = table.entries.get(id)?;
        let room = entry.lock().await;
        Some(room.clone())
    }

    async fn list(&self) -> Vec<Room> {
        let table = self.table.read().await;
        let mut rooms = Vec::with_capacity(table.order.len());
        for id in &table.order {
            if let Some(entry) = table.entries.get(id) {
                rooms.push(entry.lock().await.clone());
            }
        }
        rooms
    }

    async fn replace(&self, room: Room) -> Option<Room> {
        let table = self.table.read().await;
        let entry = table.entries.get(&room.id)?;
        let mut stored = entry.lock().await;
        *stored = room;
        Some(stored.clone())
    }

    async fn delete_if_empty(&self, id: &RoomId) -> bool {
        let mut table = self.table.write().await;
        let is_empty = match table.entries.get(id) {
            Some(entry) => entry.lock().await.is_empty(),
            None => return false,
        };
        if !is_empty {
            return false;
        }

        table.entries.remove(id);
        table.order.retain(|room_id| room_id != id);
        tracing::info!("Room '{}' deleted (no participants left)", id);
        true
    }

    async fn modify(&self, id: &RoomId, mutation: RoomMutation<'_>) -> Result<Room, RoomError> {
        let table = self.table.read().await;
        let entry = table
            .entries
            .get(id)
            .ok_or_else(|| RoomError::RoomNotFound(id.clone()))?;

        let mut stored = entry.lock().await;
        let mut draft = stored.clone();
        mutation(&mut draft)?;
        *stored = draft;
        Ok(stored.clone())
    }
}
