//! UI layer: the HTTP and WebSocket surface of the race server.

pub mod gateway;
mod handler;
mod server;
mod signal;
pub mod state;

pub use gateway::SessionGateway;
pub use server::Server;
