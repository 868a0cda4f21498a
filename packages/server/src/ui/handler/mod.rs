//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{health_check, project_history};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
