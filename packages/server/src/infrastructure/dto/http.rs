//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// Body of `POST /rooms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub room: RoomSeedDto,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomSeedDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Passage to type. Older clients send it as `word`.
    #[serde(default, alias = "word")]
    pub text: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDto {
    /// Seconds since the server started.
    pub uptime: f64,
    pub message: String,
    pub timestamp: String,
}

/// Error body of every failed HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    pub message: String,
}
