//! Server execution logic.

use std::{sync::Arc, time::Instant};

use axum::{Router, routing::get};
use keyrace_shared::time::Clock;
use tower_http::trace::TraceLayer;

use crate::usecase::{CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase};

use super::{
    gateway::SessionGateway,
    handler::{create_room, get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Typing race server
///
/// This struct encapsulates the server dependencies and provides methods to run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     gateway,
///     create_room_usecase,
///     get_rooms_usecase,
///     get_room_detail_usecase,
///     clock,
/// );
/// server.run("127.0.0.1".to_string(), 3000).await?;
/// ```
pub struct Server {
    gateway: Arc<SessionGateway>,
    create_room_usecase: Arc<CreateRoomUseCase>,
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    clock: Arc<dyn Clock>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `gateway` - Event routing for WebSocket connections
    /// * `create_room_usecase` - UseCase for room creation
    /// * `get_rooms_usecase` - UseCase for listing rooms
    /// * `get_room_detail_usecase` - UseCase for getting one room
    /// * `clock` - Time source for the health endpoint
    pub fn new(
        gateway: Arc<SessionGateway>,
        create_room_usecase: Arc<CreateRoomUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            create_room_usecase,
            get_rooms_usecase,
            get_room_detail_usecase,
            clock,
        }
    }

    /// Build the router without binding a socket.
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            gateway: self.gateway,
            create_room_usecase: self.create_room_usecase,
            get_rooms_usecase: self.get_rooms_usecase,
            get_room_detail_usecase: self.get_room_detail_usecase,
            clock: self.clock,
            started_at: Instant::now(),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/", get(health_check))
            .route("/rooms", get(get_rooms).post(create_room))
            .route("/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the typing race server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 3000)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Typing race server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
