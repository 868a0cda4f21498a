//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};

use crate::{
    domain::ProjectId,
    infrastructure::dto::{
        http::{ErrorDto, HealthDto, ProjectHistoryDto},
        websocket::ChatMessageDto,
    },
    ui::state::AppState,
    usecase::{AuthError, AuthenticateUseCase, FetchHistoryUseCase},
};

type ApiError = (StatusCode, Json<ErrorDto>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorDto {
            error: message.into(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Get the chat history of a project.
///
/// Requires `Authorization: Bearer <jwt>` for a staff or client user.
pub async fn project_history(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ProjectHistoryDto>, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let authenticate_usecase =
        AuthenticateUseCase::new(state.token_verifier.clone(), state.directory.clone());
    let identity = authenticate_usecase
        .execute(token)
        .await
        .map_err(|e| match e {
            AuthError::Directory(_) => {
                tracing::error!(error = %e, "Identity lookup failed");
                api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
            _ => api_error(StatusCode::UNAUTHORIZED, e.to_string()),
        })?;

    let project_id = ProjectId::new(project_id)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let history_usecase = FetchHistoryUseCase::new(state.messages.clone());
    let messages = history_usecase.execute(&project_id).await.map_err(|e| {
        tracing::error!(project_id = %project_id, error = %e, "Failed to load history");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    tracing::debug!(
        identity = %identity,
        project_id = %project_id,
        count = messages.len(),
        "Served project history"
    );

    Ok(Json(ProjectHistoryDto {
        project_id: project_id.into_string(),
        messages: messages.iter().map(ChatMessageDto::from).collect(),
    }))
}
