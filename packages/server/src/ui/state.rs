//! Shared application state.

use std::sync::Arc;

use tunebox_shared::time::Clock;

use crate::{
    domain::{MessagePusher, RoomRepository},
    usecase::{
        ConnectParticipantUseCase, ControlPlaybackUseCase, CreateRoomUseCase,
        DisconnectParticipantUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, SendMessageUseCase,
    },
};

/// Use cases shared by every handler
pub struct AppState {
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub control_playback_usecase: Arc<ControlPlaybackUseCase>,
}

impl AppState {
    /// Wire every use case to the same registry, broadcaster and clock
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                clock.clone(),
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            control_playback_usecase: Arc::new(ControlPlaybackUseCase::new(
                repository,
                message_pusher,
                clock,
            )),
        }
    }
}
