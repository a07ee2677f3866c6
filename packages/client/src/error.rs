//! Error types for the Tunebox client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server URL cannot be used at all
    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Input line that could not be turned into a request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown command '/{0}', type /help for the list")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{value}' is not a valid {expected}")]
    InvalidNumber {
        value: String,
        expected: &'static str,
    },

    #[error("join a room first (/rooms, /join <room_id>)")]
    NotInRoom,
}
