//! WebSocket connection handlers.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{
        CloseReason, ConnectionHandle, ConnectionIdFactory, Identity, MessageText,
        OutboundSignal, ProjectId, Shutdown, Timestamp,
    },
    infrastructure::dto::websocket::{InboundFrame, JsonChatPayloadEncoder},
    ui::state::{AppState, WsAuthQuery},
    usecase::{
        AuthenticateUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        SendMessageUseCase, SubscribeProjectUseCase,
    },
};

/// Upper bound on the best-effort close frame write after a shutdown request
const CLOSE_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

/// GET /ws?token=JWT
///
/// On auth failure the connection is upgraded and immediately closed with the
/// close code of the failure, so clients can tell the failures apart.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsAuthQuery>,
) -> Response {
    let authenticate_usecase =
        AuthenticateUseCase::new(state.token_verifier.clone(), state.directory.clone());

    match authenticate_usecase.execute(query.token.as_deref()).await {
        Ok(identity) => {
            tracing::info!(identity = %identity, "WebSocket connection authenticated");
            ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
        }
        Err(e) => {
            let reason = e.close_reason();
            tracing::warn!(close_code = reason.code(), error = %e, "WebSocket auth failed");

            ws.on_upgrade(move |mut socket| async move {
                if let Err(e) = socket.send(close_message(reason)).await {
                    tracing::debug!(error = %e, "Failed to send auth close frame");
                }
            })
        }
    }
}

fn close_message(reason: CloseReason) -> Message {
    Message::Close(Some(CloseFrame {
        code: reason.code(),
        reason: reason.reason().into(),
    }))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    let connection_id = match ConnectionIdFactory::generate() {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(identity = %identity, error = %e, "Failed to allocate connection id");
            return;
        }
    };

    // Outbound queue drained by the writer task; the registry keeps a handle to it
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = ConnectionHandle::new(
        connection_id.clone(),
        identity.clone(),
        Timestamp::now(),
        tx,
    );
    let (mut sender, receiver) = socket.split();

    // Use ConnectParticipantUseCase to register the connection
    let connect_usecase =
        ConnectParticipantUseCase::new(state.registry.clone(), state.subscriptions.clone());
    connect_usecase.execute(handle.clone()).await;
    tracing::info!(
        identity = %identity,
        connection_id = %connection_id,
        "Participant connected"
    );

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(read_inbound(receiver, state.clone(), handle.clone()));

    // Shutdown requests bypass the outbound queue and preempt a blocked writer
    let shutdown = tokio::select! {
        _ = write_outbound(&mut sender, rx) => None,
        _ = &mut recv_task => None,
        request = handle.wait_for_shutdown() => Some(request),
    };
    recv_task.abort();

    // Use DisconnectParticipantUseCase to clean up registry and subscriptions
    let disconnect_usecase =
        DisconnectParticipantUseCase::new(state.registry.clone(), state.subscriptions.clone());
    let outcome = disconnect_usecase.execute(&identity, &connection_id).await;
    tracing::info!(
        identity = %identity,
        connection_id = %connection_id,
        removed = outcome.removed,
        purged_projects = outcome.purged_projects,
        shutdown = ?shutdown,
        "Participant disconnected"
    );

    if let Some(Shutdown::Close(reason)) = shutdown {
        match tokio::time::timeout(CLOSE_FRAME_TIMEOUT, sender.send(close_message(reason))).await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "Failed to send close frame"),
            Err(_) => tracing::debug!(identity = %identity, "Timed out sending close frame"),
        }
    }
}

async fn write_outbound(
    sender: &mut SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<OutboundSignal>,
) {
    while let Some(signal) = rx.recv().await {
        let message = match signal {
            OutboundSignal::Frame(frame) => Message::Text(frame.into()),
            OutboundSignal::Ping => Message::Ping(Default::default()),
        };

        if let Err(e) = sender.send(message).await {
            tracing::debug!(error = %e, "WebSocket write failed");
            break;
        }
    }
}

async fn read_inbound(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    handle: ConnectionHandle,
) {
    let subscribe_usecase =
        SubscribeProjectUseCase::new(state.registry.clone(), state.subscriptions.clone());
    let send_usecase = SendMessageUseCase::new(
        state.messages.clone(),
        state.broker.clone(),
        Arc::new(JsonChatPayloadEncoder),
        state.topics.clone(),
    );

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(identity = %handle.identity(), error = %e, "WebSocket error");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                dispatch_frame(text.as_str(), &handle, &subscribe_usecase, &send_usecase).await;
            }
            Message::Pong(_) => handle.mark_alive(),
            Message::Close(_) => {
                tracing::info!(identity = %handle.identity(), "Client requested close");
                break;
            }
            _ => {}
        }
    }
}

/// Handle one text frame. Frames that cannot be understood are dropped and
/// the connection stays open.
async fn dispatch_frame(
    raw: &str,
    handle: &ConnectionHandle,
    subscribe_usecase: &SubscribeProjectUseCase,
    send_usecase: &SendMessageUseCase,
) {
    let frame = match InboundFrame::parse(raw) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(identity = %handle.identity(), error = %e, "Dropping malformed frame");
            return;
        }
    };

    match frame {
        InboundFrame::Subscribe { project_id } => {
            let project_id = match ProjectId::new(project_id) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(
                        identity = %handle.identity(),
                        error = %e,
                        "Dropping subscribe frame with invalid project id"
                    );
                    return;
                }
            };
            if let Err(e) = subscribe_usecase.execute(handle, project_id).await {
                tracing::warn!(identity = %handle.identity(), error = %e, "Subscribe rejected");
            }
        }
        InboundFrame::Chat { project_id, text } => {
            let (project_id, text) = match (ProjectId::new(project_id), MessageText::new(text)) {
                (Ok(project_id), Ok(text)) => (project_id, text),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!(
                        identity = %handle.identity(),
                        error = %e,
                        "Dropping chat frame with invalid fields"
                    );
                    return;
                }
            };
            if let Err(e) = send_usecase
                .execute(handle.identity().clone(), project_id, text)
                .await
            {
                tracing::error!(identity = %handle.identity(), error = %e, "Failed to relay message");
            }
        }
    }
}
