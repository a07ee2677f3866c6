//! Domain layer: the room/playback synchronization model.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod message_pusher;
pub mod playback;
pub mod repository;
pub mod value_object;

pub use entity::{
    ChatMessage, ConnectionRecord, Identity, JoinedRoom, Member, PlaybackChange,
    PlaybackCommand, PlaybackOutcome, PlaybackSnapshot, Room, RoomDetail, RoomSummary, Track,
    TrackMetadata,
};
pub use error::{MessagePushError, RepositoryError, RoomError, ValueObjectError};
pub use event::RoomEvent;
pub use factory::{ConnectionIdFactory, RoomIdFactory, TrackIdFactory};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use playback::PlaybackState;
pub use repository::{RoomRepository, SharedRoom};
pub use value_object::{
    ANONYMOUS_USERNAME, ConnectionId, MessageContent, ROOM_NAME_MAX_LEN, RoomId, RoomName,
    Timestamp, TrackDuration, TrackId, USERNAME_MAX_LEN, Username,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
