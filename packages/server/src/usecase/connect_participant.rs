//! UseCase: 接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() / greet() メソッド
//!
//! ### なぜこのテストが必要か
//! - 接続ごとに一意な ConnectionId が割り当てられることを保証
//! - Registry と MessagePusher の両方に登録されることを確認
//! - 最初のフレームが本人にだけ届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続
//! - エッジケース：同じユーザー名での複数接続

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionIdFactory, Identity, MessagePusher, PusherChannel, RoomRepository,
};

/// 接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続を登録する
    ///
    /// # Arguments
    ///
    /// * `identity` - 認証済みのユーザー情報
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// サーバーが割り当てた ConnectionId
    pub async fn execute(&self, identity: Identity, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionIdFactory::generate();

        self.repository
            .register_connection(connection_id.clone(), identity)
            .await;
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;
        tracing::debug!(
            "{} connection(s) active",
            self.repository.count_connections().await
        );

        connection_id
    }

    /// 接続直後の最初のフレームを本人だけに送る
    pub async fn greet(&self, connection_id: &ConnectionId, frame: &str) {
        if let Err(e) = self.message_pusher.push_to(connection_id, frame).await {
            tracing::warn!("Failed to greet connection '{}': {}", connection_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessagePushError, MockMessagePusher, Username},
        usecase::test_support,
    };

    fn identity(username: &str) -> Identity {
        Identity {
            username: Username::new(username.to_string()).unwrap(),
            profile_color: Some("#123456".to_string()),
        }
    }

    #[tokio::test]
    async fn test_connect_registers_identity_and_channel() {
        // テスト項目: 接続すると Registry と MessagePusher の両方に登録される
        // given (前提条件):
        let repository = test_support::repository();
        let pusher = test_support::pusher();
        let usecase = ConnectParticipantUseCase::new(repository.clone(), pusher.clone());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let connection_id = usecase.execute(identity("alice"), tx).await;

        // then (期待する結果):
        assert_eq!(repository.count_connections().await, 1);
        let registered = repository.identity(&connection_id).await.unwrap();
        assert_eq!(registered.username.as_str(), "alice");
        assert!(pusher.push_to(&connection_id, "ping").await.is_ok());
        assert_eq!(rx.recv().await, Some("ping".to_string()));
    }

    #[tokio::test]
    async fn test_same_username_gets_distinct_connections() {
        // テスト項目: 同じユーザー名でも接続ごとに別の ConnectionId になる
        // given (前提条件):
        let repository = test_support::repository();
        let usecase = ConnectParticipantUseCase::new(repository.clone(), test_support::pusher());
        let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let first = usecase.execute(identity("alice"), tx1).await;
        let second = usecase.execute(identity("alice"), tx2).await;

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(repository.count_connections().await, 2);
    }

    #[tokio::test]
    async fn test_greet_pushes_frame_to_connection_only() {
        // テスト項目: greet は指定した接続にだけフレームを送る
        // given (前提条件):
        let connection_id = ConnectionId::new("c1".to_string()).unwrap();
        let expected = connection_id.clone();
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(move |id, frame| *id == expected && frame == r#"{"type":"connected"}"#)
            .times(1)
            .returning(|_, _| Ok(()));
        pusher.expect_broadcast().never();
        let usecase = ConnectParticipantUseCase::new(test_support::repository(), Arc::new(pusher));

        // when (操作):
        usecase.greet(&connection_id, r#"{"type":"connected"}"#).await;
    }

    #[tokio::test]
    async fn test_greet_failure_is_not_fatal() {
        // テスト項目: 送信に失敗しても greet はパニックせずに終了する
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .times(1)
            .returning(|id, _| Err(MessagePushError::ClientNotFound(id.to_string())));
        let usecase = ConnectParticipantUseCase::new(test_support::repository(), Arc::new(pusher));

        // when (操作):
        usecase
            .greet(&ConnectionId::new("gone".to_string()).unwrap(), "{}")
            .await;
    }
}
