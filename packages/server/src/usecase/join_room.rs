//! UseCase: Room への参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 参加者本人を含む全メンバーに member-joined が届くことを保証
//! - 再参加でメンバーが重複しないことを確認
//! - 参加時の再生状態が壁時計に合わせて更新されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：初回参加、再参加、ユーザー名の変更
//! - 異常系：存在しない Room
//! - エッジケース：参加処理中に接続が切れた場合

use std::sync::Arc;

use tunebox_shared::time::Clock;

use crate::domain::{
    ConnectionId, JoinedRoom, Member, MessagePusher, RoomEvent, RoomId, RoomRepository, Username,
};

use super::{RoomUseCaseError, broadcast, now};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
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

    /// Room に参加する
    ///
    /// `username` が指定され接続時のものと異なる場合は、接続のユーザー名を更新する。
    /// `profile_color` は指定があれば接続時の色より優先される。
    ///
    /// # Returns
    ///
    /// 参加直後の Room の状態（メンバー、メッセージ履歴、再生状態）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        username: Option<String>,
        profile_color: Option<String>,
    ) -> Result<JoinedRoom, RoomUseCaseError> {
        let identity = self.repository.identity(connection_id).await.ok_or_else(|| {
            RoomUseCaseError::InvalidState(format!("connection '{connection_id}' is not open"))
        })?;
        let requested = username.map(Username::new).transpose()?;
        let handle = self.repository.get_room(&room_id).await?;

        let renamed = requested.filter(|name| *name != identity.username);
        let member = Member {
            connection_id: connection_id.clone(),
            username: renamed.clone().unwrap_or(identity.username),
            profile_color: profile_color.or(identity.profile_color),
            joined_at: now(self.clock.as_ref()),
        };

        let (joined, targets, auto_advanced) = {
            let mut room = handle.lock().await;
            room.join(member.clone());
            let (playback, auto_advanced) = room.playback_snapshot(now(self.clock.as_ref()));
            let joined = JoinedRoom {
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                members: room.members.clone(),
                messages: room.messages.clone(),
                playback,
            };
            (joined, room.member_ids(), auto_advanced)
        };

        // 参加処理中に切断された場合は参加を取り消す
        if !self.repository.record_join(connection_id, &room_id).await {
            handle.lock().await.leave(connection_id);
            if auto_advanced {
                let others = targets
                    .into_iter()
                    .filter(|id| id != connection_id)
                    .collect();
                broadcast(
                    self.message_pusher.as_ref(),
                    others,
                    RoomEvent::StateChanged {
                        room_id,
                        snapshot: joined.playback,
                    },
                )
                .await;
            }
            return Err(RoomUseCaseError::InvalidState(format!(
                "connection '{connection_id}' closed while joining"
            )));
        }

        if let Some(username) = renamed {
            self.repository
                .rename_connection(connection_id, username)
                .await;
        }

        tracing::info!(
            "'{}' ({}) joined room '{}' ({} members)",
            member.username,
            connection_id,
            room_id,
            joined.members.len()
        );

        if auto_advanced {
            broadcast(
                self.message_pusher.as_ref(),
                targets.clone(),
                RoomEvent::StateChanged {
                    room_id: room_id.clone(),
                    snapshot: joined.playback.clone(),
                },
            )
            .await;
        }
        broadcast(
            self.message_pusher.as_ref(),
            targets,
            RoomEvent::MemberJoined {
                room_id,
                member,
                member_count: joined.members.len(),
            },
        )
        .await;

        Ok(joined)
    }
}
