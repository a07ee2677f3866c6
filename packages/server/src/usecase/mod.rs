//! UseCase layer: one struct per workflow.
//!
//! Every use case follows the same shape: look up the room, lock it,
//! mutate it, collect the notification targets, release the lock, and
//! only then broadcast.

pub mod connect_participant;
pub mod control_playback;
pub mod create_room;
pub mod disconnect_participant;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod join_room;
pub mod leave_room;
pub mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use control_playback::ControlPlaybackUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::RoomUseCaseError;
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;

use tunebox_shared::time::Clock;

use crate::domain::{ConnectionId, MessagePusher, RoomEvent, Timestamp};

/// Best-effort fan-out; a failed broadcast never fails the operation
async fn broadcast(pusher: &dyn MessagePusher, targets: Vec<ConnectionId>, event: RoomEvent) {
    if targets.is_empty() {
        return;
    }
    if let Err(e) = pusher.broadcast(targets, &event).await {
        tracing::warn!(
            "Failed to broadcast '{}' in room '{}': {}",
            event.name(),
            event.room_id(),
            e
        );
    }
}

fn now(clock: &dyn Clock) -> Timestamp {
    Timestamp::new(clock.now_millis())
}
