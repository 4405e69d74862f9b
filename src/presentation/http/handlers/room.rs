//! Room Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{CreateRoomRequest, RoomCreatedResponse, RoomSnapshotResponse};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Create a room
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomCreatedResponse>), AppError> {
    let created = state.rooms.create_room(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Room state as seen through a slug
pub async fn get_room(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<RoomSnapshotResponse>, AppError> {
    let slug_info = state.rooms.resolve(&slug).await?;
    let room = state.rooms.snapshot(&slug_info.rpid).await?;
    Ok(Json(RoomSnapshotResponse::new(room, !slug_info.can_write())))
}
