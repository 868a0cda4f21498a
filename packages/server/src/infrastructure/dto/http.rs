//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::ChatMessageDto;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
}

/// Project chat history for the history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHistoryDto {
    pub project_id: String,
    pub messages: Vec<ChatMessageDto>,
}

/// Error body for non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
