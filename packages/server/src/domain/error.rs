//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成に失敗した
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Room に対する操作が拒否された
///
/// どちらの場合も Room の状態は変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Addressed entity (e.g. a queue index) does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation is incompatible with the current playback state
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Repository のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' does not exist")]
    RoomNotFound(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}
