//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - イベントを JSON にシリアライズして配信（push_to, broadcast）
//!
//! WebSocket の生成と書き込みタスクは UI 層（`ui/handler/websocket.rs`）が担当し、
//! この実装は受け取った sender にテキストを流すだけです。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomEvent},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの sender
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!("Client '{}' unregistered from MessagePusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to client '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let content = ServerMessage::from(event.clone())
            .to_json()
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;

        let clients = self.clients.lock().await;
        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(content.clone()) {
                        tracing::warn!(
                            "Failed to push '{}' to client '{}': {}",
                            event.name(),
                            target,
                            e
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        "Client '{}' not found during broadcast of '{}', skipping",
                        target,
                        event.name()
                    );
                }
            }
        }
        tracing::debug!("Broadcasted '{}' in room '{}'", event.name(), event.room_id());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, MessageContent, RoomId, Timestamp, Username};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定のクライアントへの送信
    // - broadcast: 複数クライアントへのイベント配信
    // - エラーハンドリング（存在しないクライアント、閉じたチャンネル）
    //
    // 【なぜこのテストが必要か】
    // - 一部のクライアントへの送信失敗が他のクライアントへの配信を妨げないことを保証する
    // ========================================

    fn connection(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn new_message_event() -> RoomEvent {
        RoomEvent::NewMessage {
            room_id: RoomId::new("r1".to_string()).unwrap(),
            message: ChatMessage {
                author: Username::new("alice".to_string()).unwrap(),
                content: MessageContent::new("hello".to_string()),
                timestamp: Timestamp::new(1_000),
                profile_color: None,
            },
        }
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のクライアントにメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(connection("c1"), tx).await;

        // when (操作):
        let result = pusher.push_to(&connection("c1"), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しないクライアントへの送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&connection("nobody"), "Hello").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("nobody".to_string()))
        );
    }

    #[tokio::test]
    async fn test_push_to_unregistered_client() {
        // テスト項目: 登録解除したクライアントには送信できない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_client(connection("c1"), tx).await;

        // when (操作):
        pusher.unregister_client(&connection("c1")).await;
        let result = pusher.push_to(&connection("c1"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_broadcast_serializes_event_for_every_target() {
        // テスト項目: 全ての対象に同じ JSON が届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        pusher.register_client(connection("c1"), tx1).await;
        pusher.register_client(connection("c2"), tx2).await;

        // when (操作):
        let result = pusher
            .broadcast(vec![connection("c1"), connection("c2")], &new_message_event())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        let first = rx1.recv().await.unwrap();
        let second = rx2.recv().await.unwrap();
        assert_eq!(first, second);
        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(value["type"], "new-message");
        assert_eq!(value["message"]["content"], "hello");
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: 存在しない・閉じたクライアントがあっても他への配信は成功する
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        pusher.register_client(connection("c1"), tx1).await;
        pusher.register_client(connection("closed"), tx2).await;
        drop(rx2);

        // when (操作):
        let result = pusher
            .broadcast(
                vec![connection("closed"), connection("missing"), connection("c1")],
                &new_message_event(),
            )
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(rx1.recv().await.is_some());
    }
}
