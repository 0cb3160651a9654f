//! Route handlers: project listing and chat.

use crate::SharedState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::Json;
use dbtchat_context::{ChatOutcome, require_fields};
use dbtchat_core::error::Error;
use dbtchat_core::message::Turn;
use dbtchat_portal::ProjectInfo;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a domain error to its HTTP status.
fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Manifest(_) | Error::Gateway(_) | Error::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<Error> for ErrorResponse {
    fn from(err: Error) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

fn from_domain(err: Error) -> ApiError {
    (status_for(&err), Json(err.into()))
}

// ── Projects ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub(crate) struct ProjectsResponse {
    projects: Vec<ProjectInfo>,
}

/// `GET /api/projects`
pub(crate) async fn projects_handler(
    State(state): State<SharedState>,
) -> Result<Json<ProjectsResponse>, ApiError> {
    let projects = state.catalog.list().await.map_err(|e| {
        error!(error = %e, "Failed to list projects");
        from_domain(e)
    })?;
    Ok(Json(ProjectsResponse { projects }))
}

// ── Chat ──────────────────────────────────────────────────────────────────

/// Chat request body. camelCase field names are accepted as aliases.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default, alias = "projectName")]
    project_name: String,
    #[serde(default)]
    message: String,
    #[serde(default, alias = "conversationHistory")]
    conversation_history: Option<Vec<Turn>>,
}

#[derive(Serialize)]
pub(crate) struct ChatResponse {
    response: String,
}

/// `POST /api/chat`
pub(crate) async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    handle_chat(state, payload)
        .instrument(info_span!("chat", %request_id))
        .await
}

async fn handle_chat(
    state: SharedState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(reason = %rejection.body_text(), "Rejected chat body");
        let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            StatusCode::BAD_REQUEST
        };
        api_error(status, rejection.body_text())
    })?;

    require_fields(&request.project_name, &request.message).map_err(from_domain)?;
    let history = request.conversation_history.unwrap_or_default();

    info!(
        project = %request.project_name,
        message_bytes = request.message.len(),
        turns = history.len(),
        "Chat request"
    );

    if let Some(refusal) = state.pipeline.screen(&request.message) {
        return Ok(Json(ChatResponse {
            response: refusal.to_string(),
        }));
    }

    let manifest = state
        .catalog
        .read_manifest(&request.project_name)
        .await
        .map_err(from_domain)?;

    match state
        .pipeline
        .run(&request.project_name, &manifest, &history, &request.message)
        .await
    {
        Ok(ChatOutcome::Answered(response) | ChatOutcome::Refused(response)) => {
            Ok(Json(ChatResponse { response }))
        }
        Err(e) => {
            error!(project = %request.project_name, error = %e, "Chat pipeline failed");
            Err(from_domain(e))
        }
    }
}
