//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum length of any identifier value object
pub const MAX_IDENTIFIER_LEN: usize = 100;

/// Maximum length of a chat message text
pub const MAX_MESSAGE_TEXT_LEN: usize = 10_000;

fn validate_identifier(kind: &'static str, id: &str) -> Result<(), ValueObjectError> {
    if id.is_empty() {
        return Err(ValueObjectError::IdentifierEmpty { kind });
    }
    let len = id.chars().count();
    if len > MAX_IDENTIFIER_LEN {
        return Err(ValueObjectError::IdentifierTooLong {
            kind,
            max: MAX_IDENTIFIER_LEN,
            actual: len,
        });
    }
    Ok(())
}

/// Declares a validated string identifier.
macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier, rejecting empty or over-long values.
            pub fn new(id: String) -> Result<Self, ValueObjectError> {
                validate_identifier(stringify!($name), &id)?;
                Ok(Self(id))
            }

            /// Get the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to owned String.
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
                write!(f, "{}", self.0)
            }
        }
    };
}

identifier! {
    /// Project identifier. A project is the chat-grouping unit.
    ProjectId
}

identifier! {
    /// Staff user identifier.
    StaffId
}

identifier! {
    /// Client-portal user identifier.
    ClientUserId
}

identifier! {
    /// Persisted chat message identifier.
    MessageId
}

identifier! {
    /// Identifier of one live WebSocket connection.
    ///
    /// Distinguishes successive connections of the same identity.
    ConnectionId
}

/// Chat message text with validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct MessageText(String);

impl MessageText {
    /// Create a new MessageText.
    ///
    /// # Arguments
    ///
    /// * `text` - The message text
    ///
    /// # Returns
    ///
    /// A Result containing the MessageText or an error if validation fails
    pub fn new(text: String) -> Result<Self, ValueObjectError> {
        if text.is_empty() {
            return Err(ValueObjectError::MessageTextEmpty);
        }
        let len = text.chars().count();
        if len > MAX_MESSAGE_TEXT_LEN {
            return Err(ValueObjectError::MessageTextTooLong {
                max: MAX_MESSAGE_TEXT_LEN,
                actual: len,
            });
        }
        Ok(Self(text))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp from Unix milliseconds.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(huddle_shared::time::now_millis())
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated identity of a connection or message sender.
///
/// Exactly one of staff user or client-portal user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Identity {
    Staff(StaffId),
    Client(ClientUserId),
}

impl Identity {
    /// The raw identifier regardless of kind.
    pub fn id_str(&self) -> &str {
        match self {
            Identity::Staff(id) => id.as_str(),
            Identity::Client(id) => id.as_str(),
        }
    }

    /// `"staff"` or `"client"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Staff(_) => "staff",
            Identity::Client(_) => "client",
        }
    }
}

impl From<StaffId> for Identity {
    fn from(id: StaffId) -> Self {
        Identity::Staff(id)
    }
}

impl From<ClientUserId> for Identity {
    fn from(id: ClientUserId) -> Self {
        Identity::Client(id)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id_str())
    }
}
