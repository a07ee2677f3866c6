//! Interactive Tunebox client.
//!
//! Joins rooms, chats and controls the shared queue from a terminal prompt.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tunebox-client -- --username alice
//! cargo run --bin tunebox-client -- -u bob -c '#3366ff' --url ws://127.0.0.1:8080/ws
//! ```

use clap::Parser;

use tunebox_client::{ClientConfig, run_client};
use tunebox_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tunebox-client")]
#[command(about = "Interactive client for Tunebox listening rooms", long_about = None)]
struct Args {
    /// Username shown to other members
    #[arg(short = 'u', long)]
    username: String,

    /// Profile colour shown next to your messages
    #[arg(short = 'c', long)]
    color: Option<String>,

    /// WebSocket server URL
    #[arg(long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ClientConfig {
        url: args.url,
        username: args.username,
        profile_color: args.color,
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
