//! WebSocket gateway: router, handlers and process lifecycle.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{build_router, run, serve, start_background_tasks};
pub use signal::shutdown_signal;
pub use state::AppState;
