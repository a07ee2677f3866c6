//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{
    ConnectionId, ConnectionRecord, Identity, RepositoryError, Room, RoomId, RoomName,
    RoomSummary, Timestamp, Username,
};

/// Room ごとに独立したロックで保護されたハンドル
///
/// 別々の Room に対する操作は互いにブロックしない。
pub type SharedRoom = Arc<Mutex<Room>>;

/// Room Registry trait
///
/// 生存中の Room の集合と、接続 ↔ ユーザー情報の対応を管理する。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 空の Room を作成し、そのスナップショットを返す
    async fn create_room(&self, name: RoomName, created_at: Timestamp) -> Room;

    /// Room のハンドルを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<SharedRoom, RepositoryError>;

    /// 全 Room の一覧（作成順のスナップショット）
    async fn list_rooms(&self) -> Vec<RoomSummary>;

    /// 接続を登録（onConnect）
    async fn register_connection(&self, connection_id: ConnectionId, identity: Identity);

    /// 接続のユーザー情報を取得
    async fn identity(&self, connection_id: &ConnectionId) -> Option<Identity>;

    /// 接続のユーザー名を更新
    async fn rename_connection(&self, connection_id: &ConnectionId, username: Username);

    /// 接続が Room に参加したことを記録
    ///
    /// 接続がすでに登録解除されていた場合は `false` を返す。
    /// 呼び出し元は Room へのメンバー追加を取り消す必要がある。
    async fn record_join(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool;

    /// 接続が Room から退出したことを記録
    async fn record_leave(&self, connection_id: &ConnectionId, room_id: &RoomId);

    /// 接続を削除し、参加していた Room の一覧を返す（onDisconnect）
    async fn unregister_connection(&self, connection_id: &ConnectionId)
    -> Option<ConnectionRecord>;

    /// 接続中のクライアント数を取得
    async fn count_connections(&self) -> usize;
}
