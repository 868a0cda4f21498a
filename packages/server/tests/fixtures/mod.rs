//! Shared helpers for the integration tests.
//!
//! Gateways run in-process on ephemeral ports. Several gateways sharing one
//! `InMemoryBroker` stand in for separate processes sharing Redis.

#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use huddle_server::{
    AppState,
    domain::ChatTopic,
    infrastructure::{
        auth::{AccessClaims, JwtTokenVerifier},
        broker::InMemoryBroker,
        repository::{InMemoryIdentityDirectory, InMemoryMessageRepository},
    },
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
    time::{sleep, timeout},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message,
};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const SECRET: &str = "integration-test-secret";

pub const DIRECTORY: &str = r#"{
    "staff": [
        {"id": "staff-1", "name": "Alice"},
        {"id": "staff-2", "name": "Carol"}
    ],
    "clientUsers": [
        {"id": "client-7", "name": "Bob", "organization": {"id": "org-1", "name": "Acme"}},
        {"id": "client-8", "name": "Dana"}
    ]
}"#;

/// In-process gateway bound to `127.0.0.1:0`
pub struct TestServer {
    pub state: Arc<AppState>,
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway with its own broker.
    pub async fn start() -> Self {
        Self::start_with(Arc::new(InMemoryBroker::new()), Duration::from_secs(30)).await
    }

    /// Start a gateway on `broker` with the given liveness interval.
    pub async fn start_with(broker: Arc<InMemoryBroker>, heartbeat: Duration) -> Self {
        let directory = Arc::new(InMemoryIdentityDirectory::from_json(DIRECTORY).unwrap());
        let state = Arc::new(AppState::new(
            Arc::new(InMemoryMessageRepository::new(directory.clone())),
            directory,
            Arc::new(JwtTokenVerifier::new(SECRET.as_bytes())),
            broker,
            ChatTopic::new("project-chat"),
        ));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn({
            let state = state.clone();
            async move {
                let shutdown = async move {
                    let _ = shutdown_rx.await;
                };
                huddle_server::serve(listener, state, heartbeat, shutdown)
                    .await
                    .unwrap();
            }
        });

        Self {
            state,
            addr,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ws://{}/ws?token={}", self.addr, token),
            None => format!("ws://{}/ws", self.addr),
        }
    }

    /// Open a WebSocket authenticated as `subject`.
    pub async fn connect(&self, subject: &str) -> Client {
        let (ws, _) = connect_async(self.ws_url(Some(&token(subject, 3600))))
            .await
            .expect("Failed to connect");
        ws
    }

    /// Open a WebSocket and wait until the gateway has registered it.
    pub async fn connect_registered(&self, subject: &str) -> Client {
        let before = self.state.registry.len().await;
        let ws = self.connect(subject).await;
        let registry = self.state.registry.clone();
        eventually(|| {
            let registry = registry.clone();
            async move { registry.len().await > before }
        })
        .await;
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.abort();
    }
}

/// Sign an access token for `subject` expiring `expires_in` seconds from now.
pub fn token(subject: &str, expires_in: i64) -> String {
    let now = huddle_shared::time::now_secs();
    let claims = AccessClaims {
        sub: subject.to_string(),
        exp: now + expires_in,
        iat: Some(now),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

/// Poll `check` until it holds, panicking after two seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("condition was not met in time");
}

pub async fn send_json(ws: &mut Client, value: serde_json::Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame as JSON, skipping control frames.
pub async fn next_json(ws: &mut Client) -> serde_json::Value {
    timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("Expected a text frame, got {other:?}"),
            }
        }
    })
    .await
    .expect("Timed out waiting for a text frame")
}

/// Whether a text frame arrives within `wait`.
pub async fn receives_text_within(ws: &mut Client, wait: Duration) -> bool {
    timeout(wait, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(_))) => return true,
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                _ => return false,
            }
        }
    })
    .await
    .unwrap_or(false)
}

/// Close code of the next close frame, skipping everything else.
pub async fn next_close_code(ws: &mut Client) -> Option<u16> {
    timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(frame))) => return frame.map(|f| u16::from(f.code)),
                Some(Ok(_)) => continue,
                Some(Err(_)) | None => return None,
            }
        }
    })
    .await
    .expect("Timed out waiting for a close frame")
}
