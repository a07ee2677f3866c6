//! Identifier factories.
//!
//! All identifiers are random UUID v4 strings, so they never collide within
//! a process lifetime.

use uuid::Uuid;

use super::value_object::{ConnectionId, RoomId, TrackId};

/// RoomId の生成
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId::from_uuid(Uuid::new_v4())
    }
}

/// ConnectionId の生成
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId::from_uuid(Uuid::new_v4())
    }
}

/// TrackId の生成
pub struct TrackIdFactory;

impl TrackIdFactory {
    pub fn generate() -> TrackId {
        TrackId::from_uuid(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_room_ids_do_not_collide() {
        // テスト項目: 連続して生成した RoomId が衝突しない
        // when (操作):
        let ids: HashSet<RoomId> = (0..1000).map(|_| RoomIdFactory::generate()).collect();

        // then (期待する結果):
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generated_ids_are_non_empty() {
        // テスト項目: 生成した ID は空ではない
        // then (期待する結果):
        assert!(!ConnectionIdFactory::generate().as_str().is_empty());
        assert!(!TrackIdFactory::generate().as_str().is_empty());
    }
}
