//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断した接続が参加中の全ての Room から取り除かれることを保証
//! - 各 Room の残りのメンバーに member-left が届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数の Room に参加した接続の切断
//! - エッジケース：二重の切断、Room に参加していない接続の切断

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomId, RoomRepository};

use super::broadcast;

/// 切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// 参加中の Room から 1 つずつ退出させ、残りのメンバーに member-left を配信する。
    /// 既に切断済みの接続に対しては何もしない。
    ///
    /// # Returns
    ///
    /// 退出した Room の ID
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let Some(record) = self.repository.unregister_connection(connection_id).await else {
            tracing::debug!("Connection '{}' was already unregistered", connection_id);
            return Vec::new();
        };

        let mut left = Vec::with_capacity(record.rooms.len());
        for room_id in record.rooms {
            let handle = match self.repository.get_room(&room_id).await {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::warn!("Skipping room during disconnect: {}", e);
                    continue;
                }
            };

            // Room のロックは 1 つずつ取得する
            let (removed, targets) = {
                let mut room = handle.lock().await;
                (room.leave(connection_id), room.member_ids())
            };
            let Some(member) = removed else {
                continue;
            };

            let member_count = targets.len();
            broadcast(
                self.message_pusher.as_ref(),
                targets,
                RoomEvent::MemberLeft {
                    room_id: room_id.clone(),
                    connection_id: member.connection_id,
                    username: member.username,
                    member_count,
                },
            )
            .await;
            left.push(room_id);
        }

        self.message_pusher.unregister_client(connection_id).await;
        tracing::info!(
            "'{}' ({}) disconnected, left {} room(s)",
            record.identity.username,
            connection_id,
            left.len()
        );

        left
    }
}
