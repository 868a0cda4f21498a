//! Domain layer for project messaging.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod auth;
pub mod broker;
pub mod connection;
pub mod entity;
pub mod error;
pub mod factory;
pub mod registry;
pub mod repository;
pub mod subscription;
pub mod value_object;

pub use auth::{TokenClaims, TokenVerifier};
pub use broker::{
    BrokerMessage, BrokerReceiver, ChatPayloadEncoder, ChatTopic, MessageBroker, topic_matches,
};
pub use connection::{CloseReason, ConnectionHandle, OutboundSignal, Shutdown};
pub use entity::{
    ChatMessage, ClientUser, EnrichedChatMessage, Organization, SenderDisplay, StaffUser,
};
pub use error::{BrokerError, RepositoryError, TokenError, ValueObjectError};
pub use factory::{ConnectionIdFactory, MessageIdFactory};
pub use registry::ConnectionRegistry;
pub use repository::{IdentityDirectory, MessageRepository};
pub use subscription::SubscriptionTable;
pub use value_object::{
    ClientUserId, ConnectionId, Identity, MessageId, MessageText, ProjectId, StaffId, Timestamp,
};

#[cfg(test)]
pub use auth::MockTokenVerifier;
#[cfg(test)]
pub use broker::{MockChatPayloadEncoder, MockMessageBroker};
#[cfg(test)]
pub use repository::{MockIdentityDirectory, MockMessageRepository};
