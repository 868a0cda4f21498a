//! Collaborator traits for persistence and identity lookups.
//!
//! The gateway only needs these few calls from the rest of the system. The
//! concrete stores live in the infrastructure layer.

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, ClientUser, EnrichedChatMessage, StaffUser},
    error::RepositoryError,
    value_object::{ClientUserId, ProjectId, StaffId},
};

/// Identity stores for staff users and client-portal users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Find a staff user by id
    async fn find_staff_by_id(&self, id: &StaffId) -> Result<Option<StaffUser>, RepositoryError>;

    /// Find a client-portal user by id
    async fn find_client_user_by_id(
        &self,
        id: &ClientUserId,
    ) -> Result<Option<ClientUser>, RepositoryError>;
}

/// Chat message persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message.
    ///
    /// The store may move `timestamp` forward so that timestamps never
    /// decrease within a project. The stored message is returned.
    async fn create_message(&self, message: ChatMessage) -> Result<ChatMessage, RepositoryError>;

    /// Join the sender's display data onto a message (read-only).
    async fn populate_sender_display(
        &self,
        message: &ChatMessage,
    ) -> Result<EnrichedChatMessage, RepositoryError>;

    /// All messages of a project in creation order.
    async fn list_by_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}
