//! The active conversation

use super::context::ModelContext;
use super::message::Message;
use crate::llm::LlmService;
use serde::Serialize;
use std::sync::Arc;

/// Prefix of the assistant message recorded for a failed model call
pub const ERROR_MARKER: &str = "❌ Error:";

/// Outcome of forwarding a user turn to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Reply {
    Text(String),
    /// The remote call failed; holds the failure description
    Failed(String),
}

impl Reply {
    /// Text shown as the assistant's message
    pub fn display_text(&self) -> String {
        match self {
            Reply::Text(text) => text.clone(),
            Reply::Failed(description) => format!("{ERROR_MARKER} {description}"),
        }
    }
}

/// Message log, model context and save guard of the conversation on screen
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    context: ModelContext,
    saved: bool,
}

impl Conversation {
    /// Empty, unsaved conversation with a fresh model context
    pub fn start_new(service: Arc<dyn LlmService>) -> Self {
        Self {
            messages: Vec::new(),
            context: ModelContext::start(service),
            saved: false,
        }
    }

    /// Conversation brought back from the archive; it is already saved.
    pub fn restored(messages: Vec<Message>, context: ModelContext) -> Self {
        Self {
            messages,
            context,
            saved: true,
        }
    }

    pub fn append_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message::user(text));
    }

    pub fn append_assistant_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message::assistant(text));
    }

    /// Forward `text` to the model. Failures come back as [`Reply::Failed`],
    /// never as an error; the conversation stays usable either way.
    pub async fn send_to_model(&mut self, text: &str, temperature: f32) -> Reply {
        match self.context.send(text, Some(temperature)).await {
            Ok(reply) => Reply::Text(reply.trim().to_string()),
            Err(e) => Reply::Failed(e.message),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub(super) fn mark_saved(&mut self) {
        self.saved = true;
    }

    #[allow(dead_code)] // Inspected by context and restore tests
    pub fn context(&self) -> &ModelContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::session::testing::MockLlmService;

    #[test]
    fn test_start_new_is_empty_and_unsaved() {
        let conv = Conversation::start_new(Arc::new(MockLlmService::new()));
        assert!(conv.is_empty());
        assert!(!conv.is_saved());
        assert_eq!(conv.context().turn_count(), 0);
    }

    #[test]
    fn test_append_keeps_order_and_roles() {
        let mut conv = Conversation::start_new(Arc::new(MockLlmService::new()));
        conv.append_user_message("Hi");
        conv.append_assistant_message("Hello");

        assert_eq!(
            conv.messages(),
            &[Message::user("Hi"), Message::assistant("Hello")]
        );
    }

    #[tokio::test]
    async fn test_send_to_model_trims_reply() {
        let llm = Arc::new(MockLlmService::new());
        llm.queue_text("  4  \n");

        let mut conv = Conversation::start_new(llm.clone());
        let reply = conv.send_to_model("What is 2+2?", 0.7).await;

        assert_eq!(reply, Reply::Text("4".to_string()));
        assert_eq!(llm.recorded_requests()[0].temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_send_to_model_failure_becomes_reply() {
        let llm = Arc::new(MockLlmService::new());
        llm.queue_error(LlmError::rate_limit("Rate limit exceeded: quota"));

        let mut conv = Conversation::start_new(llm);
        let reply = conv.send_to_model("hello", 0.7).await;

        assert!(matches!(reply, Reply::Failed(_)));
        assert_eq!(reply.display_text(), "❌ Error: Rate limit exceeded: quota");
    }
}
