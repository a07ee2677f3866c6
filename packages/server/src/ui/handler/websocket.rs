//! WebSocket connection handlers.
//!
//! Each connection gets one unbounded channel. Replies and broadcasts both
//! go through it, so a client observes frames in the order they were queued.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, Identity, MessageContent, RoomId, TrackMetadata, Username},
    infrastructure::dto::websocket::{
        ClientRequest, ReplyData, ReplyMessage, RequestOp, ServerMessage,
    },
    ui::state::AppState,
    usecase::RoomUseCaseError,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub username: Option<String>,
    pub profile_color: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    let identity = Identity {
        username: Username::or_anonymous(query.username),
        profile_color: query.profile_color.filter(|c| !c.trim().is_empty()),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Spawns a task that drains the connection's channel into the WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Queue a frame for this connection
fn send_frame(tx: &mpsc::UnboundedSender<String>, message: &ServerMessage) {
    match message.to_json() {
        Ok(json) => {
            if tx.send(json).is_err() {
                tracing::debug!("Connection closed before frame could be queued");
            }
        }
        Err(e) => tracing::error!("Failed to serialize server message: {}", e),
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    let connection_id = state
        .connect_participant_usecase
        .execute(identity.clone(), tx.clone())
        .await;
    tracing::info!("'{}' connected as '{}'", identity.username, connection_id);

    let connected = ServerMessage::Connected {
        connection_id: connection_id.to_string(),
        username: identity.username.to_string(),
        profile_color: identity.profile_color,
    };
    match connected.to_json() {
        Ok(frame) => {
            state
                .connect_participant_usecase
                .greet(&connection_id, &frame)
                .await
        }
        Err(e) => tracing::error!("Failed to serialize connected frame: {}", e),
    }

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let text = text.as_str();
                    tracing::debug!("Received from '{}': {}", connection_id_clone, text);
                    let reply = handle_text(&state_clone, &connection_id_clone, text).await;
                    send_frame(&tx, &ServerMessage::Reply(reply));
                }
                Message::Binary(_) => {
                    send_frame(
                        &tx,
                        &ServerMessage::Reply(ReplyMessage::error(
                            None,
                            "binary frames are not supported",
                        )),
                    );
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let left = state
        .disconnect_participant_usecase
        .execute(&connection_id)
        .await;
    tracing::info!(
        "Connection '{}' closed ({} room(s) notified)",
        connection_id,
        left.len()
    );
}

/// Parse one text frame, run it and build the reply
async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) -> ReplyMessage {
    let request = match ClientRequest::parse(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected frame from '{}': {}", connection_id, e.reason);
            return ReplyMessage::error(e.request_id, e.reason);
        }
    };

    let op_name = request.op.name();
    match dispatch(state, connection_id, request.op).await {
        Ok(data) => ReplyMessage::ok(request.request_id, data),
        Err(e) => {
            tracing::warn!(
                "'{}' from '{}' failed ({}): {}",
                op_name,
                connection_id,
                e.code(),
                e
            );
            ReplyMessage::error(request.request_id, e.to_string())
        }
    }
}

fn room_id(value: String) -> Result<RoomId, RoomUseCaseError> {
    Ok(RoomId::new(value)?)
}

async fn dispatch(
    state: &AppState,
    connection_id: &ConnectionId,
    op: RequestOp,
) -> Result<Option<ReplyData>, RoomUseCaseError> {
    let playback = &state.control_playback_usecase;

    let data = match op {
        RequestOp::CreateRoom { room_name } => {
            let summary = state.create_room_usecase.execute(room_name).await?;
            ReplyData::RoomCreated {
                room: summary.into(),
            }
        }
        RequestOp::GetRooms => {
            let rooms = state.get_rooms_usecase.execute().await;
            ReplyData::Rooms {
                rooms: rooms.into_iter().map(Into::into).collect(),
            }
        }
        RequestOp::GetRoomUsersCount { room_id: id } => {
            let summary = state
                .get_room_detail_usecase
                .users_count(room_id(id)?)
                .await?;
            ReplyData::UsersCount {
                room_id: summary.id.into_string(),
                room_name: summary.name.into_string(),
                member_count: summary.member_count,
            }
        }
        RequestOp::JoinRoom {
            room_id: id,
            username,
            profile_color,
        } => {
            let joined = state
                .join_room_usecase
                .execute(connection_id, room_id(id)?, username, profile_color)
                .await?;
            ReplyData::Joined(joined.into())
        }
        RequestOp::LeaveRoom { room_id: id } => {
            state
                .leave_room_usecase
                .execute(connection_id, room_id(id)?)
                .await?;
            return Ok(None);
        }
        RequestOp::SendMessage {
            room_id: id,
            content,
            profile_color,
        } => {
            state
                .send_message_usecase
                .execute(
                    connection_id,
                    room_id(id)?,
                    MessageContent::new(content),
                    profile_color,
                )
                .await?;
            return Ok(None);
        }
        RequestOp::AddToQueue { room_id: id, track } => {
            let metadata = TrackMetadata::try_from(track)?;
            let snapshot = playback
                .add_to_queue(connection_id, room_id(id)?, metadata)
                .await?;
            ReplyData::MusicState(snapshot.into())
        }
        RequestOp::PlayPause { room_id: id } => {
            ReplyData::MusicState(playback.play_pause(room_id(id)?).await?.into())
        }
        RequestOp::NextTrack { room_id: id } => {
            ReplyData::MusicState(playback.next(room_id(id)?).await?.into())
        }
        RequestOp::PreviousTrack { room_id: id } => {
            ReplyData::MusicState(playback.previous(room_id(id)?).await?.into())
        }
        RequestOp::SeekTo { room_id: id, time } => {
            ReplyData::MusicState(playback.seek(room_id(id)?, time).await?.into())
        }
        RequestOp::RemoveFromQueue {
            room_id: id,
            track_index,
        } => ReplyData::MusicState(
            playback
                .remove_from_queue(room_id(id)?, track_index)
                .await?
                .into(),
        ),
        RequestOp::GetMusicState { room_id: id } => {
            ReplyData::MusicState(playback.snapshot(room_id(id)?).await?.into())
        }
    };
    Ok(Some(data))
}
