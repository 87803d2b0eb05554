//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use keyrace_shared::time::timestamp_to_rfc3339;
use thiserror::Error;

use crate::{
    domain::RoomId,
    infrastructure::dto::{
        http::{CreateRoomRequest, HealthDto, MessageDto},
        room::RoomDto,
    },
    ui::state::AppState,
    usecase::{CreateRoomError, GetRoomDetailError},
};

/// Failures of the HTTP API. Rendered as `{message}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Room not found")]
    NotFound,

    #[error("Room '{0}' already exists")]
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        };
        let body = MessageDto {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(err: CreateRoomError) -> Self {
        match err {
            CreateRoomError::AlreadyExists(id) => ApiError::Conflict(id.into_string()),
        }
    }
}

impl From<GetRoomDetailError> for ApiError {
    fn from(err: GetRoomDetailError) -> Self {
        match err {
            GetRoomDetailError::RoomNotFound(_) => ApiError::NotFound,
        }
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    Json(HealthDto {
        uptime: state.started_at.elapsed().as_secs_f64(),
        message: "Server is up and running".to_string(),
        timestamp: timestamp_to_rfc3339(state.clock.now_millis()),
    })
}

/// Create a room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomDto>), ApiError> {
    let seed = request.room;
    // A blank id means "assign one for me".
    let id = seed.id.and_then(|id| RoomId::new(id).ok());

    let room = state
        .create_room_usecase
        .execute(id, seed.name, seed.text)
        .await
        .inspect_err(|e| tracing::warn!("Room creation rejected: {}", e))?;

    Ok((StatusCode::CREATED, Json(room.into())))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDto>, ApiError> {
    let room = state.get_room_detail_usecase.execute(room_id).await?;
    Ok(Json(room.into()))
}
