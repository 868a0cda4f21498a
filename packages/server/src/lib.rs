//! Huddle project messaging gateway.
//!
//! Authenticated WebSocket clients (staff users and client-portal users)
//! subscribe to project chat streams. Chat messages are persisted, enriched
//! with the sender's display name, and fanned out to every gateway process
//! through a publish/subscribe broadcast channel.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::{BrokerKind, Config};
pub use error::ServerError;
pub use ui::{AppState, build_router, run, serve};
