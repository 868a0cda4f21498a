//! Live connection handle.
//!
//! The handle is the registry's view of one WebSocket: an outbound queue
//! drained by the connection's writer task, a shutdown request watched by
//! the connection task, and the liveness flag shared with the liveness
//! monitor.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::{mpsc, watch};

use super::value_object::{ConnectionId, Identity, Timestamp};

/// Why the server closes a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// No `token` query parameter
    TokenMissing,
    /// Token `exp` is in the past
    TokenExpired,
    /// Malformed token or bad signature
    TokenInvalid,
    /// Token subject is neither a staff user nor a client user
    UnknownSubject,
    /// Identity stores could not be queried
    AuthUnavailable,
    /// Another connection authenticated as the same identity
    Superseded,
}

impl CloseReason {
    /// WebSocket close code sent to the peer
    pub fn code(&self) -> u16 {
        match self {
            CloseReason::TokenMissing => 4000,
            CloseReason::TokenExpired => 4001,
            CloseReason::TokenInvalid => 4002,
            CloseReason::UnknownSubject => 4003,
            CloseReason::AuthUnavailable => 1011,
            CloseReason::Superseded => 4008,
        }
    }

    /// Human readable close reason sent to the peer
    pub fn reason(&self) -> &'static str {
        match self {
            CloseReason::TokenMissing => "Token missing",
            CloseReason::TokenExpired => "Token expired",
            CloseReason::TokenInvalid => "Token invalid",
            CloseReason::UnknownSubject => "Unknown user",
            CloseReason::AuthUnavailable => "Authentication unavailable",
            CloseReason::Superseded => "Superseded by a newer connection",
        }
    }
}

/// Queued writes for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundSignal {
    /// Write a text frame
    Frame(String),
    /// Write a liveness ping
    Ping,
}

/// How the connection task must end the connection.
///
/// Shutdown requests never wait behind queued frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// Send a close frame (best effort), then drop the socket
    Close(CloseReason),
    /// Drop the socket without a close handshake
    Terminate,
}

/// Registry entry for one live connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    identity: Identity,
    connected_at: Timestamp,
    sender: mpsc::UnboundedSender<OutboundSignal>,
    shutdown: Arc<watch::Sender<Option<Shutdown>>>,
    alive: Arc<AtomicBool>,
}

impl ConnectionHandle {
    /// Create a handle. New connections start alive.
    pub fn new(
        id: ConnectionId,
        identity: Identity,
        connected_at: Timestamp,
        sender: mpsc::UnboundedSender<OutboundSignal>,
    ) -> Self {
        Self {
            id,
            identity,
            connected_at,
            sender,
            shutdown: Arc::new(watch::Sender::new(None)),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// Whether the writer task is still draining this handle
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a text frame. Returns `false` if the connection is gone.
    pub fn send_frame(&self, frame: impl Into<String>) -> bool {
        self.sender.send(OutboundSignal::Frame(frame.into())).is_ok()
    }

    /// Queue a liveness ping.
    pub fn ping(&self) -> bool {
        self.sender.send(OutboundSignal::Ping).is_ok()
    }

    /// Request a graceful close. Returns `false` if a shutdown was already
    /// requested.
    pub fn close(&self, reason: CloseReason) -> bool {
        self.request_shutdown(Shutdown::Close(reason))
    }

    /// Request the connection be dropped without a close handshake.
    /// Returns `false` if a shutdown was already requested.
    pub fn terminate(&self) -> bool {
        self.request_shutdown(Shutdown::Terminate)
    }

    fn request_shutdown(&self, request: Shutdown) -> bool {
        self.shutdown.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(request);
            true
        })
    }

    /// The first shutdown requested, if any.
    pub fn shutdown_requested(&self) -> Option<Shutdown> {
        *self.shutdown.borrow()
    }

    /// Resolve once a shutdown is requested, including one requested
    /// before this call.
    pub async fn wait_for_shutdown(&self) -> Shutdown {
        let mut requests = self.shutdown.subscribe();
        loop {
            let current = *requests.borrow_and_update();
            if let Some(request) = current {
                return request;
            }
            if requests.changed().await.is_err() {
                // Unreachable while `self` holds the sender.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Record a ping response.
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::SeqCst);
    }

    /// Clear the liveness flag, returning its previous value.
    pub fn take_alive(&self) -> bool {
        self.alive.swap(false, Ordering::SeqCst)
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}
