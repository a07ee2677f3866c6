//! UseCase: Room 詳細取得

use std::sync::Arc;

use tunebox_shared::time::Clock;

use crate::domain::{MessagePusher, RoomDetail, RoomEvent, RoomId, RoomRepository, RoomSummary};

use super::{RoomUseCaseError, broadcast, now};

/// Room 詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl GetRoomDetailUseCase {
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

    /// Room の詳細を取得する
    ///
    /// 再生状態は他の取得と同様に壁時計と突き合わせる。
    pub async fn execute(&self, room_id: RoomId) -> Result<RoomDetail, RoomUseCaseError> {
        let handle = self.repository.get_room(&room_id).await?;

        let (detail, auto_advanced, targets) = {
            let mut room = handle.lock().await;
            let (playback, auto_advanced) = room.playback_snapshot(now(self.clock.as_ref()));
            let detail = RoomDetail {
                id: room.id.clone(),
                name: room.name.clone(),
                created_at: room.created_at,
                members: room.members.clone(),
                message_count: room.messages.len(),
                playback,
            };
            (detail, auto_advanced, room.member_ids())
        };

        if auto_advanced {
            broadcast(
                self.message_pusher.as_ref(),
                targets,
                RoomEvent::StateChanged {
                    room_id,
                    snapshot: detail.playback.clone(),
                },
            )
            .await;
        }
        Ok(detail)
    }

    /// Room の名前と現在の参加者数
    pub async fn users_count(&self, room_id: RoomId) -> Result<RoomSummary, RoomUseCaseError> {
        let handle = self.repository.get_room(&room_id).await?;
        let room = handle.lock().await;
        Ok(room.summary())
    }
}
