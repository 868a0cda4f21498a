//! Server bootstrap: wiring, router and background tasks.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

use crate::{
    config::{BrokerKind, Config},
    domain::{BrokerError, ChatTopic, IdentityDirectory, MessageBroker},
    error::ServerError,
    infrastructure::{
        auth::JwtTokenVerifier,
        broker::{InMemoryBroker, RedisBroker},
        repository::{InMemoryIdentityDirectory, InMemoryMessageRepository},
    },
    ui::{
        handler::{health_check, project_history, websocket_handler},
        signal::shutdown_signal,
        state::AppState,
    },
    usecase::{DeliverMessageUseCase, LivenessMonitor},
};

/// Build the HTTP router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/projects/{project_id}/messages", get(project_history))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Subscribe to the broadcast channel and spawn the delivery loop and the
/// liveness monitor.
pub async fn start_background_tasks(
    state: &Arc<AppState>,
    heartbeat: Duration,
) -> Result<Vec<JoinHandle<()>>, BrokerError> {
    let pattern = state.topics.pattern();
    let receiver = state.broker.subscribe(&pattern).await?;
    tracing::info!(pattern = %pattern, "Subscribed to broadcast channel");

    let deliver_usecase = DeliverMessageUseCase::new(
        state.registry.clone(),
        state.subscriptions.clone(),
        state.topics.clone(),
    );
    let monitor = LivenessMonitor::new(state.registry.clone(), heartbeat);

    Ok(vec![
        tokio::spawn(deliver_usecase.run(receiver)),
        tokio::spawn(monitor.run()),
    ])
}

/// Serve the gateway on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    heartbeat: Duration,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let tasks = start_background_tasks(&state, heartbeat).await?;
    let app = build_router(state);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    for task in tasks {
        task.abort();
    }
    result.map_err(ServerError::Io)
}

/// Build every component from `config` and run the server until a shutdown
/// signal arrives.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let directory = match &config.directory_file {
        Some(path) => InMemoryIdentityDirectory::from_json_file(path)?,
        None => {
            tracing::warn!("No directory file configured, every connection will be rejected");
            InMemoryIdentityDirectory::new()
        }
    };
    let (staff, client_users) = directory.counts();
    tracing::info!(staff, client_users, "Loaded identity directory");
    let directory: Arc<dyn IdentityDirectory> = Arc::new(directory);

    let broker: Arc<dyn MessageBroker> = match config.broker {
        BrokerKind::Memory => {
            tracing::info!("Using in-process broadcast channel");
            Arc::new(InMemoryBroker::new())
        }
        BrokerKind::Redis => {
            tracing::info!(url = %config.redis_url, "Connecting to Redis broadcast channel");
            Arc::new(RedisBroker::connect(&config.redis_url).await?)
        }
    };

    let state = Arc::new(AppState::new(
        Arc::new(InMemoryMessageRepository::new(directory.clone())),
        directory,
        Arc::new(JwtTokenVerifier::new(config.jwt_secret.as_bytes())),
        broker,
        ChatTopic::new(config.channel_namespace.clone()),
    ));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %address, "Listening");

    serve(
        listener,
        state,
        config.heartbeat_interval(),
        shutdown_signal(),
    )
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
