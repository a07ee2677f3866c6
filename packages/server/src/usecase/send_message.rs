//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - メッセージ履歴への追加と、送信者を含む全メンバーへの配信
//!
//! ### なぜこのテストが必要か
//! - 全メンバーが同じ順序でメッセージを受け取ることを保証
//! - サーバー側でタイムスタンプが付与されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：存在しない Room
//! - エッジケース：空のメッセージ

use std::sync::Arc;

use tunebox_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessagePusher, RoomEvent, RoomId, RoomRepository,
};

use super::{RoomUseCaseError, broadcast, now};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 送信者の接続
    /// * `room_id` - 送信先の Room
    /// * `content` - メッセージ内容（検証しない）
    /// * `profile_color` - 指定がなければ接続時の色を使う
    ///
    /// # Returns
    ///
    /// 履歴に追加されたメッセージ
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        content: MessageContent,
        profile_color: Option<String>,
    ) -> Result<ChatMessage, RoomUseCaseError> {
        let identity = self.repository.identity(connection_id).await.ok_or_else(|| {
            RoomUseCaseError::InvalidState(format!("connection '{connection_id}' is not open"))
        })?;
        let handle = self.repository.get_room(&room_id).await?;

        let message = ChatMessage {
            author: identity.username,
            content,
            timestamp: now(self.clock.as_ref()),
            profile_color: profile_color.or(identity.profile_color),
        };

        // 1. Room のメッセージ履歴に追加し、配信対象を取得
        let targets = {
            let mut room = handle.lock().await;
            room.add_message(message.clone());
            room.member_ids()
        };
        tracing::debug!(
            "'{}' sent a message to room '{}' ({} recipients)",
            message.author,
            room_id,
            targets.len()
        );

        // 2. 送信者を含む全メンバーに配信
        broadcast(
            self.message_pusher.as_ref(),
            targets,
            RoomEvent::NewMessage {
                room_id,
                message: message.clone(),
            },
        )
        .await;

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockMessagePusher, Timestamp},
        usecase::{
            JoinRoomUseCase,
            test_support::{self, connect, drain},
        },
    };
    use tunebox_shared::time::ManualClock;

    fn content(text: &str) -> MessageContent {
        MessageContent::new(text.to_string())
    }

    #[tokio::test]
    async fn test_messages_are_observed_by_all_members_in_order() {
        // テスト項目: 2 人が参加し、一方のメッセージを両者が同じ順序で受け取る
        // given (前提条件):
        let repository = test_support::repository();
        let pusher = test_support::pusher();
        let clock = ManualClock::new(1_000);
        let room = repository
            .create_room(test_support::room_name("Lounge"), Timestamp::new(0))
            .await;
        let join =
            JoinRoomUseCase::new(repository.clone(), pusher.clone(), Arc::new(clock.clone()));
        let (alice, mut alice_rx) = connect(&repository, &pusher, "c1", "alice").await;
        let (bob, mut bob_rx) = connect(&repository, &pusher, "c2", "bob").await;
        join.execute(&alice, room.id.clone(), None, None).await.unwrap();
        join.execute(&bob, room.id.clone(), None, None).await.unwrap();
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        let usecase = SendMessageUseCase::new(repository.clone(), pusher, Arc::new(clock.clone()));

        // when (操作):
        usecase
            .execute(&alice, room.id.clone(), content("first"), None)
            .await
            .unwrap();
        clock.advance_millis(10);
        usecase
            .execute(&alice, room.id.clone(), content("second"), None)
            .await
            .unwrap();

        // then (期待する結果):
        for rx in [&mut alice_rx, &mut bob_rx] {
            let frames = drain(rx);
            let contents: Vec<&str> = frames
                .iter()
                .map(|f| f["message"]["content"].as_str().unwrap())
                .collect();
            assert_eq!(contents, vec!["first", "second"]);
            assert_eq!(frames[0]["message"]["username"], "alice");
            assert_eq!(frames[0]["message"]["timestamp"], 1_000);
            assert_eq!(frames[1]["message"]["timestamp"], 1_010);
        }
        let handle = repository.get_room(&room.id).await.unwrap();
        assert_eq!(handle.lock().await.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_message_is_accepted() {
        // テスト項目: 空のメッセージも履歴に追加される
        // given (前提条件):
        let repository = test_support::repository();
        let pusher = test_support::pusher();
        let room = repository
            .create_room(test_support::room_name("Lounge"), Timestamp::new(0))
            .await;
        let (alice, _rx) = connect(&repository, &pusher, "c1", "alice").await;
        let usecase =
            SendMessageUseCase::new(repository.clone(), pusher, Arc::new(ManualClock::new(0)));

        // when (操作):
        let message = usecase
            .execute(&alice, room.id, content(""), Some("#ff0000".to_string()))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(message.content.as_str(), "");
        assert_eq!(message.profile_color.as_deref(), Some("#ff0000"));
    }

    #[tokio::test]
    async fn test_send_to_unknown_room() {
        // テスト項目: 存在しない Room への送信は NotFound で、何も配信しない
        // given (前提条件):
        let repository = test_support::repository();
        let (alice, _rx) = connect(&repository, &test_support::pusher(), "c1", "alice").await;
        let mut pusher = MockMessagePusher::new();
        pusher.expect_broadcast().never();
        let usecase =
            SendMessageUseCase::new(repository, Arc::new(pusher), Arc::new(ManualClock::new(0)));

        // when (操作):
        let result = usecase
            .execute(
                &alice,
                RoomId::new("missing".to_string()).unwrap(),
                content("hi"),
                None,
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RoomUseCaseError::NotFound(_))));
    }
}
