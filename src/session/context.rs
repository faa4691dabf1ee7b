//! Model-side dialogue context
//!
//! Gemini's `generateContent` is stateless, so the handle keeps the turns the
//! model has already seen and resends them with every request. Only exchanges
//! that completed successfully become part of the context.

use crate::llm::{LlmError, LlmMessage, LlmRequest, LlmService, MessageRole};
use std::sync::Arc;

/// Handle to a live model conversation
pub struct ModelContext {
    service: Arc<dyn LlmService>,
    history: Vec<LlmMessage>,
}

impl ModelContext {
    /// Start a conversation with no prior turns
    pub fn start(service: Arc<dyn LlmService>) -> Self {
        Self {
            service,
            history: Vec::new(),
        }
    }

    /// Rebuild a context by sending each user turn, in order, through a fresh
    /// handle. The model regenerates its own replies along the way.
    pub async fn replay(
        service: Arc<dyn LlmService>,
        user_turns: Vec<String>,
    ) -> Result<Self, LlmError> {
        let mut context = Self::start(service);
        for text in user_turns {
            context.send(&text, None).await?;
        }
        Ok(context)
    }

    /// Send a user turn and return the model's reply text
    pub async fn send(&mut self, text: &str, temperature: Option<f32>) -> Result<String, LlmError> {
        let mut messages = self.history.clone();
        messages.push(LlmMessage::user(text));

        let request = LlmRequest {
            messages,
            temperature,
        };
        let response = self.service.complete(&request).await?;

        self.history.push(LlmMessage::user(text));
        self.history.push(LlmMessage::assistant(response.text.clone()));
        Ok(response.text)
    }

    /// User turns the model has seen, oldest first
    #[allow(dead_code)] // Inspected by restore tests
    pub fn user_turns(&self) -> impl Iterator<Item = &str> {
        self.history
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.text.as_str())
    }

    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("model", &self.service.model_id())
            .field("turns", &self.history.len())
            .finish()
    }
}
