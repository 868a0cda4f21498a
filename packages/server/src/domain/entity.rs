//! Core domain models for project messaging.

use serde::{Deserialize, Serialize};

use super::value_object::{
    ClientUserId, Identity, MessageId, MessageText, ProjectId, StaffId, Timestamp,
};

/// A staff member of the agency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: StaffId,
    /// Display name
    pub name: String,
}

/// The organization a client-portal user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    /// Display name
    pub name: String,
}

/// A client-portal user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUser {
    pub id: ClientUserId,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub organization: Option<Organization>,
}

/// A persisted chat message posted to a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub project_id: ProjectId,
    /// Who posted the message (staff xor client)
    pub sender: Identity,
    pub text: MessageText,
    /// Server-assigned creation time
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(
        id: MessageId,
        project_id: ProjectId,
        sender: Identity,
        text: MessageText,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            project_id,
            sender,
            text,
            timestamp,
        }
    }
}

/// Sender display data joined onto a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SenderDisplay {
    Staff {
        id: StaffId,
        name: String,
    },
    Client {
        id: ClientUserId,
        name: String,
        organization_name: Option<String>,
    },
}

impl SenderDisplay {
    /// The sender identity this display data belongs to
    pub fn identity(&self) -> Identity {
        match self {
            SenderDisplay::Staff { id, .. } => Identity::Staff(id.clone()),
            SenderDisplay::Client { id, .. } => Identity::Client(id.clone()),
        }
    }

    /// Sender display name
    pub fn name(&self) -> &str {
        match self {
            SenderDisplay::Staff { name, .. } | SenderDisplay::Client { name, .. } => name,
        }
    }
}

impl From<&StaffUser> for SenderDisplay {
    fn from(user: &StaffUser) -> Self {
        SenderDisplay::Staff {
            id: user.id.clone(),
            name: user.name.clone(),
        }
    }
}

impl From<&ClientUser> for SenderDisplay {
    fn from(user: &ClientUser) -> Self {
        SenderDisplay::Client {
            id: user.id.clone(),
            name: user.name.clone(),
            organization_name: user.organization.as_ref().map(|org| org.name.clone()),
        }
    }
}

/// A chat message with its sender display data populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedChatMessage {
    pub id: MessageId,
    pub project_id: ProjectId,
    pub sender: SenderDisplay,
    pub text: MessageText,
    pub timestamp: Timestamp,
}

impl EnrichedChatMessage {
    /// Join a persisted message with its sender display data
    pub fn new(message: ChatMessage, sender: SenderDisplay) -> Self {
        Self {
            id: message.id,
            project_id: message.project_id,
            sender,
            text: message.text,
            timestamp: message.timestamp,
        }
    }

    /// Raw sender identity
    pub fn identity(&self) -> Identity {
        self.sender.identity()
    }
}
