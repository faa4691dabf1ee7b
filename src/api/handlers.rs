//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{ChatRequest, ErrorResponse, InfoResponse, SessionView, SuccessResponse};
use super::AppState;
use crate::runtime::{DispatchError, SessionId};
use crate::session::{ArchiveId, Event, SessionError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Single page UI
        .route("/", get(serve_page))
        .route("/assets/*path", get(serve_static))
        .route("/api/info", get(get_info))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(end_session))
        // User actions
        .route("/api/sessions/:id/new", post(new_chat))
        .route("/api/sessions/:id/history/:entry", post(load_archived))
        .route("/api/sessions/:id/chat", post(send_chat))
        .with_state(state)
}

async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (StatusCode::NOT_FOUND, Html("<h1>404 - UI not found</h1>")).into_response(),
    }
}

async fn get_info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        model: state.sessions.model_id().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        live_sessions: state.sessions.live_sessions().await,
    })
}

// ============================================================
// Session lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let view = state.sessions.create(SessionView::render).await;
    (StatusCode::CREATED, Json(view))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, id, Event::Refresh).await
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.end(id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Unknown session {id}")))
    }
}

// ============================================================
// User actions
// ============================================================

async fn new_chat(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, id, Event::NewChat).await
}

async fn load_archived(
    State(state): State<AppState>,
    Path((id, entry)): Path<(SessionId, ArchiveId)>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, id, Event::LoadArchived { id: entry }).await
}

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<SessionId>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<SessionView>, AppError> {
    dispatch(&state, id, Event::UserMessage { text: req.text }).await
}

async fn dispatch(
    state: &AppState,
    id: SessionId,
    event: Event,
) -> Result<Json<SessionView>, AppError> {
    let view = state
        .sessions
        .dispatch(id, event, |session, result| {
            SessionView::after(id, session, result)
        })
        .await?;
    Ok(Json(view))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        let message = err.to_string();
        match err {
            DispatchError::UnknownSession(_)
            | DispatchError::Session(SessionError::UnknownArchiveEntry(_)) => {
                AppError::NotFound(message)
            }
            DispatchError::Session(SessionError::EmptyMessage) => AppError::BadRequest(message),
            DispatchError::Session(SessionError::Replay(_)) => AppError::BadGateway(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        tracing::debug!(status = %status, error = %message, "Request failed");
        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
