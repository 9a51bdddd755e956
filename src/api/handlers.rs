//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AcceptedResponse, CreateSessionRequest, ErrorResponse, HandoffResponse, SendMessageRequest,
    SessionResponse, StatusResponse, SuccessResponse,
};
use super::AppState;
use crate::catalog::PageContext;
use crate::dialogue::TransitionError;
use crate::handoff::TEMPLATE_KEY;
use crate::runtime::{SessionError, SseEvent};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/version", get(get_version))
        // Session lifecycle
        .route("/api/sessions/new", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(close_session))
        // User messages
        .route("/api/sessions/:id/messages", post(send_message))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // Template handoff slot
        .route("/api/sessions/:id/handoff", get(get_handoff))
        .with_state(state)
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        message: "SANI dialogue router running",
    })
}

async fn get_version() -> &'static str {
    concat!("sani-router ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Json<SessionResponse> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let page = req
        .page
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(PageContext::new)
        .unwrap_or_default();

    let handle = state.sessions.create(page).await;
    let session = handle.snapshot();
    tracing::info!(session_id = %session.session_id, page = %session.page, "Session created");

    Json(SessionResponse { session })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.snapshot(&id).await?;
    Ok(Json(SessionResponse { session }))
}

async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.close(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Messages
// ============================================================

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let Json(req) = body.map_err(|e| {
        tracing::debug!(session_id = %id, error = %e, "Rejected message body");
        AppError::BadRequest("text harus berupa string".to_string())
    })?;

    state.sessions.submit(&id, &req.text).await?;

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
}

// ============================================================
// Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, broadcast_rx) = state.sessions.subscribe(&id).await?;

    let snapshot =
        serde_json::to_value(&snapshot).map_err(|e| AppError::Internal(e.to_string()))?;
    let init_event = SseEvent::Init { snapshot };

    Ok(sse_stream(init_event, broadcast_rx))
}

// ============================================================
// Handoff
// ============================================================

async fn get_handoff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HandoffResponse>, AppError> {
    let value = state.sessions.handoff(&id).await?;
    Ok(Json(HandoffResponse {
        key: TEMPLATE_KEY,
        value,
    }))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        let message = error.to_string();
        match error {
            SessionError::NotFound(_) | SessionError::Closed => AppError::NotFound(message),
            SessionError::Rejected(TransitionError::Busy) => AppError::Conflict(message),
            SessionError::Rejected(TransitionError::EmptyMessage) => AppError::BadRequest(message),
            SessionError::Rejected(TransitionError::UnexpectedEvent { .. }) => {
                AppError::Internal(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
