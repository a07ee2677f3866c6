//! UseCase: Room 作成

use std::sync::Arc;

use tunebox_shared::time::Clock;

use crate::domain::{RoomName, RoomRepository, RoomSummary};

use super::{RoomUseCaseError, now};

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 名前を検証して新しい Room を作成する
    ///
    /// 空白のみ、または長すぎる名前は `InvalidInput`。
    pub async fn execute(&self, name: String) -> Result<RoomSummary, RoomUseCaseError> {
        let name = RoomName::new(name)?;
        let room = self
            .repository
            .create_room(name, now(self.clock.as_ref()))
            .await;
        tracing::info!("Room '{}' ({}) created", room.name.as_str(), room.id);
        Ok(room.summary())
    }
}
