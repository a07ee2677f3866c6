//! Tunebox room server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tunebox-server
//! cargo run --bin tunebox-server -- --host 0.0.0.0 --port 3000 --log-level info
//! ```

use std::sync::Arc;

use clap::Parser;
use tunebox_server::{
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::{AppState, Server},
};
use tunebox_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tunebox-server")]
#[command(about = "Room server with chat and synchronized playback", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(short = 'l', long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // 1. Create Repository (in-memory registry)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Wire the use cases and run the server
    let state = AppState::new(repository, message_pusher, Arc::new(SystemClock));
    if let Err(e) = Server::new(state).run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
