//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - 接続へのフレーム送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の受け付けは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は UI 層が生成した `UnboundedSender` を受け取り、送信にのみ使用します。
//! 実際のソケットへの書き込みは接続ごとの送信タスクが担当するため、
//! ここでの送信はブロックしません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(connection_id.clone(), tx).await;
/// pusher.push_to(&connection_id, "{\"event\":\"room:left\",\"data\":{\"roomId\":\"R1\"}}").await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中の WebSocket sender
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!("Connection '{}' unregistered from MessagePusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ConnectionNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("Failed to push message to connection '{}': {}", target, e);
                    } else {
                        tracing::debug!("Broadcasted message to connection '{}'", target);
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        Ok(())
    }
}
