//! API request and response types

use crate::session::{ArchiveId, Message, Reply, SessionState, Transition, TransitionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Sidebar entry
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: ArchiveId,
    pub title: String,
    pub saved_at: DateTime<Utc>,
}

/// Everything the page needs to draw one session
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
    /// Most recent first
    pub history: Vec<HistoryEntry>,
    pub current_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
}

impl SessionView {
    pub fn render(session_id: Uuid, state: &SessionState) -> Self {
        Self {
            session_id,
            messages: state.conversation().messages().to_vec(),
            history: state
                .archive()
                .list()
                .map(|entry| HistoryEntry {
                    id: entry.id(),
                    title: entry.title().to_string(),
                    saved_at: entry.saved_at(),
                })
                .collect(),
            current_saved: state.conversation().is_saved(),
            reply: None,
        }
    }

    pub fn after(session_id: Uuid, state: &SessionState, result: &TransitionResult) -> Self {
        let mut view = Self::render(session_id, state);
        if let Transition::Replied { reply } = &result.transition {
            view.reply = Some(reply.clone());
        }
        view
    }
}

/// Response for ending a session
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Service information
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub model: String,
    pub version: &'static str,
    pub live_sessions: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
