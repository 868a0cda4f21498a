//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Identifier validation error
    #[error("{kind} cannot be empty")]
    IdentifierEmpty { kind: &'static str },

    /// Identifier too long error
    #[error("{kind} cannot exceed {max} characters (got {actual})")]
    IdentifierTooLong {
        kind: &'static str,
        max: usize,
        actual: usize,
    },

    /// MessageText validation error
    #[error("MessageText cannot be empty")]
    MessageTextEmpty,

    /// MessageText too long error
    #[error("MessageText cannot exceed {max} characters (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },
}

/// Errors returned by persistence and identity lookups
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The sender referenced by a message no longer exists
    #[error("Sender not found: {0}")]
    SenderNotFound(String),

    /// The backing store could not serve the request
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the cross-process broadcast channel
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Could not reach the broker
    #[error("Broker connection failed: {0}")]
    Connection(String),

    /// Publishing a payload failed
    #[error("Publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },

    /// Subscribing to a pattern failed
    #[error("Subscribe to '{pattern}' failed: {reason}")]
    Subscribe { pattern: String, reason: String },

    /// A message could not be encoded into a payload
    #[error("Payload encoding failed: {0}")]
    Encode(String),
}

/// Errors returned by bearer token verification
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token signature is valid but `exp` is in the past
    #[error("Token expired")]
    Expired,

    /// Malformed token, bad signature or missing claims
    #[error("Token invalid: {0}")]
    Invalid(String),
}
