//! Host-side session storage
//!
//! Each browser session gets its own [`SessionState`], created when the page
//! opens and dropped when it ends or sits idle past the configured timeout.
//! Interactions on one session are serialized by its mutex; sessions never
//! share state.

use crate::session::{Event, SessionController, SessionError, SessionState, TransitionResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

pub type SessionId = Uuid;

const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Errors from routing an event to a session
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown session {0}")]
    UnknownSession(SessionId),
    #[error(transparent)]
    Session(#[from] SessionError),
}

struct LiveSession {
    state: SessionState,
    last_active: Instant,
}

/// Manager for all live sessions
pub struct SessionManager {
    controller: SessionController,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<LiveSession>>>>,
}

impl SessionManager {
    pub fn new(controller: SessionController, idle_timeout: Duration) -> Self {
        Self {
            controller,
            idle_timeout,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session and render its initial state
    pub async fn create<R>(&self, render: impl FnOnce(SessionId, &SessionState) -> R) -> R {
        let id = Uuid::new_v4();
        let state = self.controller.new_session();
        let view = render(id, &state);

        let live = LiveSession {
            state,
            last_active: Instant::now(),
        };
        let mut sessions = self.sessions.write().await;
        sessions.insert(id, Arc::new(Mutex::new(live)));
        tracing::info!(session = %id, live = sessions.len(), "Session started");
        view
    }

    /// Drop a session and everything it holds. Returns false if it was unknown.
    pub async fn end(&self, id: SessionId) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(&id).is_some();
        if removed {
            tracing::info!(session = %id, live = sessions.len(), "Session ended");
        }
        removed
    }

    /// Apply `event` to a session and render the resulting state
    pub async fn dispatch<R>(
        &self,
        id: SessionId,
        event: Event,
        render: impl FnOnce(&SessionState, &TransitionResult) -> R,
    ) -> Result<R, DispatchError> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(DispatchError::UnknownSession(id))?;

        let mut live = session.lock().await;
        tracing::debug!(session = %id, event = event.name(), "Dispatching event");
        let result = self.controller.dispatch(&mut live.state, event).await;
        live.last_active = Instant::now();
        let result = result?;

        if !result.archived.is_empty() {
            tracing::info!(session = %id, entries = ?result.archived, "Conversation archived");
        }
        Ok(render(&live.state, &result))
    }

    /// Drop every session idle for longer than the timeout and return how
    /// many were removed. Sessions in the middle of a dispatch are kept.
    pub async fn remove_idle(&self) -> usize {
        let now = Instant::now();
        let timeout = self.idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, session| {
            let Ok(live) = session.try_lock() else {
                return true;
            };
            let idle = now.duration_since(live.last_active);
            if idle < timeout {
                return true;
            }
            tracing::info!(session = %id, idle_secs = idle.as_secs(), "Session expired");
            false
        });

        before - sessions.len()
    }

    /// Spawn the task that periodically calls [`Self::remove_idle`]
    pub fn start_idle_sweeper(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        let period = (self.idle_timeout / 4).max(MIN_SWEEP_PERIOD);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            tracing::info!(period_secs = period.as_secs(), "Idle session sweeper started");
            loop {
                ticker.tick().await;
                let removed = manager.remove_idle().await;
                if removed > 0 {
                    tracing::debug!(removed, "Swept idle sessions");
                }
            }
        });
    }

    pub async fn live_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn model_id(&self) -> &str {
        self.controller.model_id()
    }
}
