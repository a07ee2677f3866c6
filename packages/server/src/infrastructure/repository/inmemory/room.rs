//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロックの構成
//!
//! - `rooms`: Room ID → Room ハンドルのマップ（RwLock）。
//!   Arc を clone する間だけ保持し、Room 自体のロックとは独立。
//! - `connections`: 接続 ID → ユーザー情報と参加中の Room の集合（Mutex）。
//!
//! 2 つのロックを同時に保持することはない。

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{
    ConnectionId, ConnectionRecord, Identity, RepositoryError, Room, RoomId, RoomIdFactory,
    RoomName, RoomRepository, RoomSummary, SharedRoom, Timestamp, Username,
};

/// 接続ごとの情報
#[derive(Debug)]
struct ConnectionEntry {
    identity: Identity,
    /// 参加中の Room（切断時の掃除に使う）
    rooms: HashSet<RoomId>,
}

/// インメモリ Room Registry 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<RoomId, SharedRoom>>,
    connections: Mutex<HashMap<ConnectionId, ConnectionEntry>>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, name: RoomName, created_at: Timestamp) -> Room {
        let room = Room::new(RoomIdFactory::generate(), name, created_at);
        let snapshot = room.clone();

        let mut rooms = self.rooms.write().await;
        rooms.insert(room.id.clone(), Arc::new(Mutex::new(room)));
        tracing::debug!("Room '{}' registered ({} rooms)", snapshot.id, rooms.len());

        snapshot
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<SharedRoom, RepositoryError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))
    }

    async fn list_rooms(&self) -> Vec<RoomSummary> {
        // Registry のロックは Arc の clone の間だけ保持する
        let handles: Vec<SharedRoom> = {
            let rooms = self.rooms.read().await;
            rooms.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let room = handle.lock().await;
            summaries.push(room.summary());
        }
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries
    }

    async fn register_connection(&self, connection_id: ConnectionId, identity: Identity) {
        let mut connections = self.connections.lock().await;
        connections.insert(
            connection_id,
            ConnectionEntry {
                identity,
                rooms: HashSet::new(),
            },
        );
    }

    async fn identity(&self, connection_id: &ConnectionId) -> Option<Identity> {
        let connections = self.connections.lock().await;
        connections
            .get(connection_id)
            .map(|entry| entry.identity.clone())
    }

    async fn rename_connection(&self, connection_id: &ConnectionId, username: Username) {
        let mut connections = self.connections.lock().await;
        if let Some(entry) = connections.get_mut(connection_id) {
            entry.identity.username = username;
        }
    }

    async fn record_join(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get_mut(connection_id) {
            Some(entry) => {
                entry.rooms.insert(room_id.clone());
                true
            }
            None => false,
        }
    }

    async fn record_leave(&self, connection_id: &ConnectionId, room_id: &RoomId) {
        let mut connections = self.connections.lock().await;
        if let Some(entry) = connections.get_mut(connection_id) {
            entry.rooms.remove(room_id);
        }
    }

    async fn unregister_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<ConnectionRecord> {
        let mut connections = self.connections.lock().await;
        let entry = connections.remove(connection_id)?;

        let mut rooms: Vec<RoomId> = entry.rooms.into_iter().collect();
        rooms.sort();
        Some(ConnectionRecord {
            identity: entry.identity,
            rooms,
        })
    }

    async fn count_connections(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}
