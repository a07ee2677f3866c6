//! MessagePusher trait 定義
//!
//! 接続中のクライアントへのメッセージ送信を抽象化します。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomEvent};

/// クライアントへ送るテキストフレームのチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Event Broadcaster
///
/// 配信はベストエフォート。一部のクライアントへの送信失敗は
/// 他のクライアントへの配信や、呼び出し元の操作を失敗させない。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントの登録を解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントにテキストを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントにイベントを配信
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;
}
