//! User actions delivered to a session

use super::archive::ArchiveId;

/// One user interaction. Each variant is handled by exactly one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// "New chat" control activated
    NewChat,
    /// History entry activated in the sidebar
    LoadArchived { id: ArchiveId },
    /// Text submitted from the input box
    UserMessage { text: String },
    /// Plain render with no action
    Refresh,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::NewChat => "new_chat",
            Event::LoadArchived { .. } => "load_archived",
            Event::UserMessage { .. } => "user_message",
            Event::Refresh => "refresh",
        }
    }
}
