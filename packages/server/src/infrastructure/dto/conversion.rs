//! Conversion logic between DTOs and domain entities.

use tunebox_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatMessage, JoinedRoom, Member, PlaybackSnapshot, RoomDetail, RoomEvent, RoomSummary, Track,
    TrackDuration, TrackMetadata, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl TryFrom<dto::NewTrackDto> for TrackMetadata {
    type Error = ValueObjectError;

    fn try_from(dto: dto::NewTrackDto) -> Result<Self, Self::Error> {
        Ok(Self {
            duration: TrackDuration::from_secs(dto.duration_seconds)?,
            title: dto.title,
            preview_url: dto.preview_url,
            artwork: dto.artwork,
        })
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Track> for dto::TrackDto {
    fn from(model: Track) -> Self {
        Self {
            id: model.id.into_string(),
            title: model.title,
            preview_url: model.preview_url,
            artwork: model.artwork,
            duration_seconds: model.duration.as_secs(),
            added_by: model.added_by.into_string(),
        }
    }
}

impl From<Member> for dto::MemberDto {
    fn from(model: Member) -> Self {
        Self {
            connection_id: model.connection_id.into_string(),
            username: model.username.into_string(),
            profile_color: model.profile_color,
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<ChatMessage> for dto::MessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            username: model.author.into_string(),
            content: model.content.into_string(),
            timestamp: model.timestamp.value(),
            profile_color: model.profile_color,
        }
    }
}

impl From<PlaybackSnapshot> for dto::PlaybackStateDto {
    fn from(model: PlaybackSnapshot) -> Self {
        Self {
            current_track: model.current_track.map(Into::into),
            current_index: model.current_index,
            is_playing: model.is_playing,
            elapsed_seconds: model.elapsed_seconds,
            queue: model.queue.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RoomSummary> for dto::RoomInfoDto {
    fn from(model: RoomSummary) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name.into_string(),
            member_count: model.member_count,
            created_at: model.created_at.value(),
        }
    }
}

impl From<JoinedRoom> for dto::JoinedRoomDto {
    fn from(model: JoinedRoom) -> Self {
        Self {
            room_id: model.room_id.into_string(),
            room_name: model.room_name.into_string(),
            member_count: model.members.len(),
            members: model.members.into_iter().map(Into::into).collect(),
            messages: model.messages.into_iter().map(Into::into).collect(),
            music_state: model.playback.into(),
        }
    }
}

impl From<RoomEvent> for dto::ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::MemberJoined {
                room_id,
                member,
                member_count,
            } => Self::MemberJoined {
                room_id: room_id.into_string(),
                member: member.into(),
                member_count,
            },
            RoomEvent::MemberLeft {
                room_id,
                connection_id,
                username,
                member_count,
            } => Self::MemberLeft {
                room_id: room_id.into_string(),
                connection_id: connection_id.into_string(),
                username: username.into_string(),
                member_count,
            },
            RoomEvent::NewMessage { room_id, message } => Self::NewMessage {
                room_id: room_id.into_string(),
                message: message.into(),
            },
            RoomEvent::StateChanged { room_id, snapshot } => Self::StateChanged {
                room_id: room_id.into_string(),
                music_state: snapshot.into(),
            },
            RoomEvent::QueueUpdated {
                room_id,
                queue,
                current_index,
            } => Self::QueueUpdated {
                room_id: room_id.into_string(),
                queue: queue.into_iter().map(Into::into).collect(),
                current_index,
            },
        }
    }
}

impl From<RoomSummary> for http::RoomSummaryDto {
    fn from(model: RoomSummary) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name.into_string(),
            member_count: model.member_count,
        }
    }
}

impl From<RoomSummary> for http::CreatedRoomDto {
    fn from(model: RoomSummary) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<Member> for http::MemberDetailDto {
    fn from(model: Member) -> Self {
        Self {
            connection_id: model.connection_id.into_string(),
            username: model.username.into_string(),
            profile_color: model.profile_color,
            joined_at: timestamp_to_rfc3339(model.joined_at.value()),
        }
    }
}

impl From<RoomDetail> for http::RoomDetailDto {
    fn from(model: RoomDetail) -> Self {
        Self {
            id: model.id.into_string(),
            name: model.name.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            members: model.members.into_iter().map(Into::into).collect(),
            message_count: model.message_count,
            playback: model.playback.into(),
        }
    }
}
