//! UseCase: Room 一覧取得

use std::sync::Arc;

use crate::domain::{RoomRepository, RoomSummary};

/// Room 一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 作成順の Room 一覧（取得時点のスナップショット）
    pub async fn execute(&self) -> Vec<RoomSummary> {
        self.repository.list_rooms().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Timestamp, usecase::test_support};

    #[tokio::test]
    async fn test_get_rooms_empty() {
        // テスト項目: Room がなければ空の一覧
        // given (前提条件):
        let usecase = GetRoomsUseCase::new(test_support::repository());

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        assert!(rooms.is_empty());
    }

    #[tokio::test]
    async fn test_get_rooms_in_creation_order() {
        // テスト項目: 一覧は作成順に並ぶ
        // given (前提条件):
        let repository = test_support::repository();
        repository
            .create_room(test_support::room_name("Later"), Timestamp::new(20))
            .await;
        repository
            .create_room(test_support::room_name("Earlier"), Timestamp::new(10))
            .await;
        let usecase = GetRoomsUseCase::new(repository);

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        let names: Vec<&str> = rooms.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Earlier", "Later"]);
    }
}
