//! Infrastructure layer: concrete registry, broadcaster and wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;
