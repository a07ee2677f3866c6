//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::PlaybackStateDto;

/// `GET /api/rooms` の 1 要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
    pub member_count: usize,
}

/// `POST /api/rooms` のリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// `POST /api/rooms` のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRoomDto {
    pub id: String,
    pub name: String,
    /// RFC 3339
    pub created_at: String,
}

/// `GET /api/rooms/{room_id}` のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub name: String,
    /// RFC 3339
    pub created_at: String,
    pub members: Vec<MemberDetailDto>,
    pub message_count: usize,
    pub playback: PlaybackStateDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDetailDto {
    pub connection_id: String,
    pub username: String,
    pub profile_color: Option<String>,
    /// RFC 3339
    pub joined_at: String,
}
