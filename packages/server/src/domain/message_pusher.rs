//! MessagePusher trait 定義
//!
//! 接続中のクライアントへメッセージを届けるためのインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// Outbound channel of one connection. Frames are serialized JSON text.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a newly opened connection.
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Forget a closed connection.
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Push one frame to one connection.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Push one frame to many connections. Individual failures are tolerated.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
