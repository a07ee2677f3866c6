//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{CreateRoomRequest, CreatedRoomDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::RoomUseCaseError,
};

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(error: RoomUseCaseError) -> ApiError {
    let status = match error {
        RoomUseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
        RoomUseCaseError::InvalidState(_) => StatusCode::CONFLICT,
        RoomUseCaseError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(serde_json::json!({"error": error.to_string(), "code": error.code()})),
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.into_iter().map(Into::into).collect())
}

/// Create a room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreatedRoomDto>), ApiError> {
    let summary = state
        .create_room_usecase
        .execute(request.name)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(summary.into())))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, ApiError> {
    let room_id = RoomId::new(room_id).map_err(|e| api_error(e.into()))?;
    let detail = state
        .get_room_detail_usecase
        .execute(room_id)
        .await
        .map_err(api_error)?;
    Ok(Json(detail.into()))
}
