//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: request/reply/event frames
//! - `http`: HTTP API bodies
//!
//! `conversion` holds the `From`/`TryFrom` impls between DTOs and the domain.

pub mod conversion;
pub mod http;
pub mod websocket;
