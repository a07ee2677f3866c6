//! UI layer: the axum WebSocket/HTTP adapter.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
