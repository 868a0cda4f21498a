//! Domain factories for generating identifiers.

use super::{ConnectionId, MessageId, error::ValueObjectError};

/// Factory for generating MessageId instances.
///
/// Separates the generation concern from the validation logic in MessageId.
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a new MessageId with a random UUID v4.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for consistency
    /// with the domain error handling pattern.
    pub fn generate() -> Result<MessageId, ValueObjectError> {
        MessageId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Factory for generating ConnectionId instances.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a new ConnectionId with a random UUID v4.
    pub fn generate() -> Result<ConnectionId, ValueObjectError> {
        ConnectionId::new(uuid::Uuid::new_v4().to_string())
    }
}
