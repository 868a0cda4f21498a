//! Process-level errors.

use thiserror::Error;

use crate::{domain::BrokerError, infrastructure::repository::DirectoryLoadError};

/// Fatal startup and serve errors. The binary exits non-zero on any of these.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Broadcast channel unavailable: {0}")]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Directory(#[from] DirectoryLoadError),
}
