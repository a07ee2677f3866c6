//! Tunebox server library.
//!
//! Rooms where members chat and share one synchronized playback queue,
//! served over WebSocket with a small HTTP API alongside.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
