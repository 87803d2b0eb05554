//! Value objects
//!
//! 識別子とタイムスタンプを表す不変の値。生成時に検証されます。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier, rejecting blank values.
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.trim().is_empty() {
                    return Err(ValueObjectError::Empty($label));
                }
                Ok(Self(value))
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
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
    /// Room identifier, immutable after creation.
    RoomId,
    "room id"
);

string_id!(
    /// Participant identifier supplied by the client, stable across reconnects.
    ParticipantId,
    "participant id"
);

string_id!(
    /// Handle of one live WebSocket connection, minted by the server.
    ConnectionId,
    "connection id"
);

impl RoomId {
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid.to_string())
    }
}

impl ConnectionId {
    /// Mint a fresh connection id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, clamped at zero.
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        (self.0 - earlier.0).max(0)
    }
}
