//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, RoomError, ValueObjectError};

/// Room に対する操作のエラー
///
/// セッション層ではそのまま `{success: false, message}` の reply になる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomUseCaseError {
    /// The room (or an addressed queue entry) does not exist
    #[error("{0}")]
    NotFound(String),

    /// The operation conflicts with the current room or connection state
    #[error("{0}")]
    InvalidState(String),

    /// The request carried an invalid value
    #[error("{0}")]
    InvalidInput(String),
}

impl RoomUseCaseError {
    /// Short machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

impl From<RepositoryError> for RoomUseCaseError {
    fn from(error: RepositoryError) -> Self {
        Self::NotFound(error.to_string())
    }
}

impl From<RoomError> for RoomUseCaseError {
    fn from(error: RoomError) -> Self {
        match error {
            RoomError::NotFound(reason) => Self::NotFound(reason),
            RoomError::InvalidState(reason) => Self::InvalidState(reason),
        }
    }
}

impl From<ValueObjectError> for RoomUseCaseError {
    fn from(error: ValueObjectError) -> Self {
        Self::InvalidInput(error.to_string())
    }
}
