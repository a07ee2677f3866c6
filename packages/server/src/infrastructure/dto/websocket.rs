//! WebSocket message DTOs.
//!
//! Every frame is a JSON text frame. Client requests carry a `type` naming
//! the operation and an optional `request_id` echoed back in the reply.
//! Server frames carry a `type` naming either `reply` or a pushed event.

use serde::{Deserialize, Serialize};

/// Track length assumed when the client does not send one
pub const DEFAULT_TRACK_DURATION_SECS: f64 = 30.0;

fn default_duration_seconds() -> f64 {
    DEFAULT_TRACK_DURATION_SECS
}

// ========================================
// Client → Server
// ========================================

/// One request frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRequest {
    #[serde(default)]
    pub request_id: Option<u64>,
    #[serde(flatten)]
    pub op: RequestOp,
}

/// A request frame that could not be understood
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParseError {
    /// Echoed when the frame was valid JSON carrying a numeric `request_id`
    pub request_id: Option<u64>,
    pub reason: String,
}

impl ClientRequest {
    /// Parse a text frame.
    ///
    /// Malformed JSON yields no `request_id`; a well-formed frame with an
    /// unknown operation still reports the `request_id` it carried.
    pub fn parse(text: &str) -> Result<Self, RequestParseError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| RequestParseError {
                request_id: None,
                reason: format!("malformed JSON: {e}"),
            })?;
        let request_id = value.get("request_id").and_then(serde_json::Value::as_u64);

        serde_json::from_value(value).map_err(|e| RequestParseError {
            request_id,
            reason: format!("invalid request: {e}"),
        })
    }
}

/// Operations a client can request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RequestOp {
    CreateRoom {
        room_name: String,
    },
    GetRooms,
    GetRoomUsersCount {
        room_id: String,
    },
    JoinRoom {
        room_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile_color: Option<String>,
    },
    LeaveRoom {
        room_id: String,
    },
    SendMessage {
        room_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile_color: Option<String>,
    },
    AddToQueue {
        room_id: String,
        track: NewTrackDto,
    },
    PlayPause {
        room_id: String,
    },
    NextTrack {
        room_id: String,
    },
    PreviousTrack {
        room_id: String,
    },
    SeekTo {
        room_id: String,
        time: f64,
    },
    RemoveFromQueue {
        room_id: String,
        track_index: usize,
    },
    GetMusicState {
        room_id: String,
    },
}

impl RequestOp {
    /// Wire name of the operation, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create-room",
            Self::GetRooms => "get-rooms",
            Self::GetRoomUsersCount { .. } => "get-room-users-count",
            Self::JoinRoom { .. } => "join-room",
            Self::LeaveRoom { .. } => "leave-room",
            Self::SendMessage { .. } => "send-message",
            Self::AddToQueue { .. } => "add-to-queue",
            Self::PlayPause { .. } => "play-pause",
            Self::NextTrack { .. } => "next-track",
            Self::PreviousTrack { .. } => "previous-track",
            Self::SeekTo { .. } => "seek-to",
            Self::RemoveFromQueue { .. } => "remove-from-queue",
            Self::GetMusicState { .. } => "get-music-state",
        }
    }
}

/// Track metadata sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrackDto {
    pub title: String,
    pub preview_url: String,
    #[serde(default)]
    pub artwork: String,
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f64,
}

// ========================================
// Server → Client
// ========================================

/// One server frame: a reply or a pushed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// First frame on every connection
    Connected {
        connection_id: String,
        username: String,
        #[serde(default)]
        profile_color: Option<String>,
    },
    Reply(ReplyMessage),
    MemberJoined {
        room_id: String,
        member: MemberDto,
        member_count: usize,
    },
    MemberLeft {
        room_id: String,
        connection_id: String,
        username: String,
        member_count: usize,
    },
    NewMessage {
        room_id: String,
        message: MessageDto,
    },
    StateChanged {
        room_id: String,
        music_state: PlaybackStateDto,
    },
    QueueUpdated {
        room_id: String,
        queue: Vec<TrackDto>,
        #[serde(default)]
        current_index: Option<usize>,
    },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Reply to one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub request_id: Option<u64>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ReplyData>,
}

impl ReplyMessage {
    pub fn ok(request_id: Option<u64>, data: Option<ReplyData>) -> Self {
        Self {
            request_id,
            success: true,
            message: None,
            data,
        }
    }

    pub fn error(request_id: Option<u64>, message: impl Into<String>) -> Self {
        Self {
            request_id,
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Payload of a successful reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReplyData {
    RoomCreated {
        room: RoomInfoDto,
    },
    Rooms {
        rooms: Vec<RoomInfoDto>,
    },
    UsersCount {
        room_id: String,
        room_name: String,
        member_count: usize,
    },
    Joined(JoinedRoomDto),
    MusicState(PlaybackStateDto),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInfoDto {
    pub id: String,
    pub name: String,
    pub member_count: usize,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRoomDto {
    pub room_id: String,
    pub room_name: String,
    pub member_count: usize,
    pub members: Vec<MemberDto>,
    pub messages: Vec<MessageDto>,
    pub music_state: PlaybackStateDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDto {
    pub connection_id: String,
    pub username: String,
    #[serde(default)]
    pub profile_color: Option<String>,
    pub joined_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    pub username: String,
    pub content: String,
    pub timestamp: i64,
    #[serde(default)]
    pub profile_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDto {
    pub id: String,
    pub title: String,
    pub preview_url: String,
    pub artwork: String,
    pub duration_seconds: f64,
    pub added_by: String,
}

/// Playback snapshot as seen by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStateDto {
    #[serde(default)]
    pub current_track: Option<TrackDto>,
    #[serde(default)]
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub elapsed_seconds: f64,
    pub queue: Vec<TrackDto>,
}
