//! UseCase: Room からの退出

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, RoomId, RoomRepository};

use super::{RoomUseCaseError, broadcast};

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room から退出する
    ///
    /// メンバーでない場合も成功する（冪等）。
    /// 残ったメンバーに member-left を配信する。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<(), RoomUseCaseError> {
        let handle = self.repository.get_room(&room_id).await?;

        let (removed, targets) = {
            let mut room = handle.lock().await;
            (room.leave(connection_id), room.member_ids())
        };
        self.repository.record_leave(connection_id, &room_id).await;

        let Some(member) = removed else {
            tracing::debug!("'{}' was not a member of room '{}'", connection_id, room_id);
            return Ok(());
        };

        tracing::info!(
            "'{}' ({}) left room '{}' ({} members)",
            member.username,
            connection_id,
            room_id,
            targets.len()
        );
        let member_count = targets.len();
        broadcast(
            self.message_pusher.as_ref(),
            targets,
            RoomEvent::MemberLeft {
                room_id,
                connection_id: member.connection_id,
                username: member.username,
                member_count,
            },
        )
        .await;

        Ok(())
    }
}
