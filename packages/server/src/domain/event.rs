//! Notifications fanned out to the members of a room.

use super::{
    entity::{ChatMessage, Member, PlaybackSnapshot, Track},
    value_object::{ConnectionId, RoomId, Username},
};

/// Room 内の状態変化を表すイベント
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    MemberJoined {
        room_id: RoomId,
        member: Member,
        member_count: usize,
    },
    MemberLeft {
        room_id: RoomId,
        connection_id: ConnectionId,
        username: Username,
        member_count: usize,
    },
    NewMessage {
        room_id: RoomId,
        message: ChatMessage,
    },
    /// Full playback snapshot
    StateChanged {
        room_id: RoomId,
        snapshot: PlaybackSnapshot,
    },
    /// Queue contents and current index only
    QueueUpdated {
        room_id: RoomId,
        queue: Vec<Track>,
        current_index: Option<usize>,
    },
}

impl RoomEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::MemberJoined { .. } => "member-joined",
            Self::MemberLeft { .. } => "member-left",
            Self::NewMessage { .. } => "new-message",
            Self::StateChanged { .. } => "state-changed",
            Self::QueueUpdated { .. } => "queue-updated",
        }
    }

    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::MemberJoined { room_id, .. }
            | Self::MemberLeft { room_id, .. }
            | Self::NewMessage { room_id, .. }
            | Self::StateChanged { room_id, .. }
            | Self::QueueUpdated { room_id, .. } => room_id,
        }
    }
}
