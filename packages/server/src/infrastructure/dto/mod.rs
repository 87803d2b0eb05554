//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `room`: JSON shape of a room, shared by both protocols
//! - `websocket`: event envelopes exchanged over the WebSocket
//! - `http`: HTTP API request/response bodies

pub mod conversion;
pub mod http;
pub mod room;
pub mod websocket;
