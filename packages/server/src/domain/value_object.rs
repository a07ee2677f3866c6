//! Value Object 定義
//!
//! 不変で、値そのものが同一性を表すドメインの型。
//! 生成時にバリデーションを行い、不正な値を持つインスタンスを作らせない。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a username (in characters)
pub const USERNAME_MAX_LEN: usize = 32;

/// Maximum length of a room name (in characters)
pub const ROOM_NAME_MAX_LEN: usize = 100;

/// Username used when the identity collaborator did not supply one
pub const ANONYMOUS_USERNAME: &str = "anonymous";

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    Ok(())
}

fn require_max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValueObjectError> {
    if value.chars().count() > max {
        return Err(ValueObjectError::TooLong { field, max });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing identifier string
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                require_non_empty($field, &value)?;
                Ok(Self(value))
            }

            /// Create from a freshly generated UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Room identifier
    RoomId,
    "room_id"
);

string_id!(
    /// Identifier of one WebSocket connection (assigned by the server)
    ConnectionId,
    "connection_id"
);

string_id!(
    /// Identifier of one queue entry (assigned by the server)
    TrackId,
    "track_id"
);

/// Display name of a user, as verified by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        require_non_empty("username", &value)?;
        require_max_len("username", &value, USERNAME_MAX_LEN)?;
        Ok(Self(value))
    }

    /// The placeholder identity for connections that arrive without a name
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_USERNAME.to_string())
    }

    /// Parse an optional raw username, falling back to [`Username::anonymous`]
    pub fn or_anonymous(value: Option<String>) -> Self {
        value
            .and_then(|v| Self::new(v).ok())
            .unwrap_or_else(Self::anonymous)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display name of a room, immutable after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        require_non_empty("room_name", &value)?;
        require_max_len("room_name", &value, ROOM_NAME_MAX_LEN)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Chat message body.
///
/// Content is stored as sent; blank messages are a caller-side concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self`; a clock that went backwards yields 0
    pub fn seconds_since(&self, earlier: Timestamp) -> f64 {
        let millis = self.0.saturating_sub(earlier.0).max(0);
        millis as f64 / 1000.0
    }
}

/// Track length in seconds; always finite and positive
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TrackDuration(f64);

impl TrackDuration {
    pub fn from_secs(seconds: f64) -> Result<Self, ValueObjectError> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ValueObjectError::Invalid {
                field: "duration_seconds",
                reason: format!("expected a positive number of seconds, got {seconds}"),
            });
        }
        Ok(Self(seconds))
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}
