//! Server state shared by every connection.

use serde::Deserialize;
use std::sync::Arc;

use crate::domain::{
    ChatTopic, ConnectionRegistry, IdentityDirectory, MessageBroker, MessageRepository,
    SubscriptionTable, TokenVerifier,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// Identity -> live connection of this process
    pub registry: Arc<ConnectionRegistry>,
    /// Project -> subscribed identities of this process
    pub subscriptions: Arc<SubscriptionTable>,
    /// Repository（データアクセス層の抽象化）
    pub messages: Arc<dyn MessageRepository>,
    pub directory: Arc<dyn IdentityDirectory>,
    pub token_verifier: Arc<dyn TokenVerifier>,
    /// Broadcast channel shared with every other gateway process
    pub broker: Arc<dyn MessageBroker>,
    pub topics: ChatTopic,
}

impl AppState {
    /// Create state with an empty registry and subscription table.
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        directory: Arc<dyn IdentityDirectory>,
        token_verifier: Arc<dyn TokenVerifier>,
        broker: Arc<dyn MessageBroker>,
        topics: ChatTopic,
    ) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            subscriptions: Arc::new(SubscriptionTable::new()),
            messages,
            directory,
            token_verifier,
            broker,
            topics,
        }
    }
}
