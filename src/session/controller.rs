//! Per-interaction session transitions
//!
//! Every event runs the same ordered checks:
//! 1. new chat: save the outgoing conversation, then replace it
//! 2. save the current conversation if it has never been saved
//! 3. load from history: restore messages and replay user turns
//! 4. user message: append, ask the model, append the reply, save
//! 5. anything else: leave state as it is
//!
//! Later checks rely on the save guard updates made by earlier ones.

use super::archive::{Archive, ArchiveId};
use super::context::ModelContext;
use super::conversation::{Conversation, Reply};
use super::event::Event;
use crate::llm::{LlmError, LlmService};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Everything one browser session owns
#[derive(Debug)]
pub struct SessionState {
    conversation: Conversation,
    archive: Archive,
}

impl SessionState {
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    fn save_current(&mut self) -> Option<ArchiveId> {
        self.archive.save_once(&mut self.conversation)
    }
}

/// What a dispatch did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Idle,
    Started,
    Restored { id: ArchiveId },
    Replied { reply: Reply },
}

/// Result of dispatching one event
#[derive(Debug)]
pub struct TransitionResult {
    pub transition: Transition,
    /// Archive entries created while handling the event
    pub archived: Vec<ArchiveId>,
}

impl TransitionResult {
    fn new() -> Self {
        Self {
            transition: Transition::Idle,
            archived: Vec::new(),
        }
    }

    fn record_save(&mut self, saved: Option<ArchiveId>) {
        self.archived.extend(saved);
    }
}

/// Errors that can occur while handling an event
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Message text is empty")]
    EmptyMessage,
    #[error("No archived conversation with id {0}")]
    UnknownArchiveEntry(ArchiveId),
    #[error("Failed to restore conversation: {0}")]
    Replay(#[source] LlmError),
}

/// Applies events to session state
pub struct SessionController {
    service: Arc<dyn LlmService>,
    temperature: f32,
}

impl SessionController {
    pub fn new(service: Arc<dyn LlmService>, temperature: f32) -> Self {
        Self {
            service,
            temperature,
        }
    }

    /// State for a session that just started: empty conversation, empty archive
    pub fn new_session(&self) -> SessionState {
        SessionState {
            conversation: Conversation::start_new(self.service.clone()),
            archive: Archive::new(),
        }
    }

    pub fn model_id(&self) -> &str {
        self.service.model_id()
    }

    /// Handle one user interaction
    pub async fn dispatch(
        &self,
        state: &mut SessionState,
        event: Event,
    ) -> Result<TransitionResult, SessionError> {
        if let Event::UserMessage { text } = &event {
            if text.is_empty() {
                return Err(SessionError::EmptyMessage);
            }
        }

        let mut result = TransitionResult::new();

        if event == Event::NewChat {
            result.record_save(state.save_current());
            state.conversation = Conversation::start_new(self.service.clone());
            result.transition = Transition::Started;
            tracing::info!("Started new conversation");
        }

        result.record_save(state.save_current());

        match event {
            Event::LoadArchived { id } => {
                let entry = state
                    .archive
                    .get(id)
                    .ok_or(SessionError::UnknownArchiveEntry(id))?;
                let messages = entry.messages().to_vec();
                let user_turns = entry.user_turns();
                let replayed = user_turns.len();

                let context = ModelContext::replay(self.service.clone(), user_turns)
                    .await
                    .map_err(SessionError::Replay)?;

                let turns = context.turn_count();
                state.conversation = Conversation::restored(messages, context);
                result.transition = Transition::Restored { id };
                tracing::info!(entry = %id, replayed, turns, "Restored archived conversation");
            }
            Event::UserMessage { text } => {
                let conversation = &mut state.conversation;
                conversation.append_user_message(text.clone());
                let reply = conversation.send_to_model(&text, self.temperature).await;
                conversation.append_assistant_message(reply.display_text());

                result.record_save(state.save_current());
                result.transition = Transition::Replied { reply };
            }
            Event::NewChat | Event::Refresh => {}
        }

        Ok(result)
    }
}
