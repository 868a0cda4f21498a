//! WebSocket message DTOs for project chat.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{BrokerError, ChatPayloadEncoder, EnrichedChatMessage, SenderDisplay};

/// Outbound message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    Message,
}

/// Frames a client may send
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum InboundFrame {
    /// Join a project's chat stream
    Subscribe {
        #[serde(default)]
        project_id: String,
    },
    /// Post a chat message
    Chat {
        #[serde(default)]
        project_id: String,
        #[serde(default)]
        text: String,
    },
}

/// Chat frame without a `type` discriminator, as sent by older clients
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UntaggedChatFrame {
    #[serde(default)]
    project_id: String,
    text: String,
}

/// Why an inbound frame was not understood
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame has neither a type nor a text field")]
    Unrecognized,
}

impl InboundFrame {
    /// Parse a text frame.
    ///
    /// Frames carrying `type` are dispatched on it. Frames without `type`
    /// are accepted as chat frames when they carry `text`.
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(raw)?;
        if value.get("type").is_some() {
            return Ok(serde_json::from_value(value)?);
        }
        if value.get("text").is_some() {
            let legacy: UntaggedChatFrame = serde_json::from_value(value)?;
            return Ok(InboundFrame::Chat {
                project_id: legacy.project_id,
                text: legacy.text,
            });
        }
        Err(FrameError::Unrecognized)
    }
}

/// Sender display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderDto {
    /// `"staff"` or `"client"`
    pub kind: String,
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
}

impl From<&SenderDisplay> for SenderDto {
    fn from(sender: &SenderDisplay) -> Self {
        match sender {
            SenderDisplay::Staff { id, name } => Self {
                kind: "staff".to_string(),
                id: id.as_str().to_string(),
                name: name.clone(),
                organization_name: None,
            },
            SenderDisplay::Client {
                id,
                name,
                organization_name,
            } => Self {
                kind: "client".to_string(),
                id: id.as_str().to_string(),
                name: name.clone(),
                organization_name: organization_name.clone(),
            },
        }
    }
}

/// A chat message with sender display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub project_id: String,
    pub sender: SenderDto,
    pub text: String,
    /// Unix timestamp (milliseconds since epoch)
    pub timestamp: i64,
    pub sent_at: String, // ISO 8601
}

impl From<&EnrichedChatMessage> for ChatMessageDto {
    fn from(message: &EnrichedChatMessage) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            project_id: message.project_id.as_str().to_string(),
            sender: SenderDto::from(&message.sender),
            text: message.text.as_str().to_string(),
            timestamp: message.timestamp.value(),
            sent_at: huddle_shared::time::millis_to_rfc3339(message.timestamp.value()),
        }
    }
}

/// Chat message broadcast to project subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBroadcastMessage {
    pub r#type: MessageType,
    pub message: ChatMessageDto,
}

impl ChatBroadcastMessage {
    pub fn new(message: &EnrichedChatMessage) -> Self {
        Self {
            r#type: MessageType::Message,
            message: ChatMessageDto::from(message),
        }
    }
}

/// Encodes chat messages as JSON [`ChatBroadcastMessage`] frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChatPayloadEncoder;

impl ChatPayloadEncoder for JsonChatPayloadEncoder {
    fn encode(&self, message: &EnrichedChatMessage) -> Result<Vec<u8>, BrokerError> {
        serde_json::to_vec(&ChatBroadcastMessage::new(message))
            .map_err(|e| BrokerError::Encode(e.to_string()))
    }
}
