//! keyrace server: rooms, races and their WebSocket event surface.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
