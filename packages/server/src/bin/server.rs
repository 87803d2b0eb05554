//! Typing race coordination server.
//!
//! Hosts rooms of up to three racers and relays race events between them.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin keyrace-server
//! cargo run --bin keyrace-server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use keyrace_server::{
    domain::{MessagePusher, RoomRepository},
    infrastructure::{
        factory::UuidRoomIdFactory, message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
    ui::{Server, SessionGateway},
    usecase::{
        BroadcastRouter, CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, RoomLifecycle,
    },
};
use keyrace_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "keyrace-server")]
#[command(about = "Multiplayer typing race server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "KEYRACE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Default log level when RUST_LOG is unset
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository and clock
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory database)
    let repository: Arc<dyn RoomRepository> =
        Arc::new(InMemoryRoomRepository::new(Arc::new(UuidRoomIdFactory)));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let lifecycle = Arc::new(RoomLifecycle::new(repository.clone(), clock.clone()));
    let router = Arc::new(BroadcastRouter::new(message_pusher));
    let gateway = Arc::new(SessionGateway::new(lifecycle, router));
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(repository.clone(), clock.clone()));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(
        gateway,
        create_room_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
        clock,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
