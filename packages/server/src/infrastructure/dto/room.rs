//! JSON shape of rooms and participants.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomPhaseDto {
    #[default]
    Lobby,
    Active,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePointDto {
    pub time_remaining: f64,
    pub wpm: f64,
    pub accuracy: f64,
    pub error: f64,
    pub word_count: u32,
    pub character_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub wpm: f64,
    #[serde(default)]
    pub done_at: Option<String>,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub performance_data: Vec<PerformancePointDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub participants: Vec<ParticipantDto>,
    #[serde(default)]
    pub phase: RoomPhaseDto,
    #[serde(default)]
    pub text: String,
    /// RFC 3339
    pub created_at: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    /// Milliseconds
    #[serde(default)]
    pub total_time: i64,
}
