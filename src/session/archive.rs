//! Archive of saved conversations
//!
//! Entries are snapshots: they copy the message log at save time and are
//! never modified or removed afterwards.

use super::conversation::Conversation;
use super::message::Message;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const MAX_TITLE_CHARS: usize = 40;
const FALLBACK_TITLE: &str = "Chat";

/// Identifier of an archive entry
pub type ArchiveId = Uuid;

/// A saved conversation
#[derive(Debug, Clone)]
pub struct ArchivedConversation {
    id: ArchiveId,
    title: String,
    messages: Vec<Message>,
    saved_at: DateTime<Utc>,
}

impl ArchivedConversation {
    pub fn id(&self) -> ArchiveId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }

    /// User turns in original order
    pub fn user_turns(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.is_user())
            .map(|m| m.content().to_string())
            .collect()
    }
}

/// Saved conversations in save order
#[derive(Debug, Default)]
pub struct Archive {
    entries: Vec<ArchivedConversation>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot of `conversation` unless it is already saved or has
    /// no messages yet. Returns the new entry's id when something was saved.
    pub fn save_once(&mut self, conversation: &mut Conversation) -> Option<ArchiveId> {
        if conversation.is_saved() || conversation.is_empty() {
            return None;
        }

        let entry = ArchivedConversation {
            id: Uuid::new_v4(),
            title: derive_title(conversation.messages()),
            messages: conversation.messages().to_vec(),
            saved_at: Utc::now(),
        };
        let id = entry.id;

        tracing::debug!(entry = %id, title = %entry.title, messages = entry.messages.len(), "Archived conversation");
        self.entries.push(entry);
        conversation.mark_saved();
        Some(id)
    }

    /// Entries most-recent-first
    pub fn list(&self) -> impl Iterator<Item = &ArchivedConversation> {
        self.entries.iter().rev()
    }

    pub fn get(&self, id: ArchiveId) -> Option<&ArchivedConversation> {
        self.entries.iter().find(|e| e.id == id)
    }
}

/// Title of a conversation: its first user message, cut to 40 characters
/// with a trailing `…` when longer.
pub fn derive_title(messages: &[Message]) -> String {
    let first = messages
        .iter()
        .find(|m| m.is_user())
        .map_or(FALLBACK_TITLE, Message::content);

    let mut chars = first.chars();
    let head: String = chars.by_ref().take(MAX_TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::MockLlmService;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn conversation_with(user_text: &str) -> Conversation {
        let mut conv = Conversation::start_new(Arc::new(MockLlmService::new()));
        conv.append_user_message(user_text);
        conv.append_assistant_message("reply");
        conv
    }

    #[test]
    fn test_title_short_message() {
        assert_eq!(derive_title(&[Message::user("Hello")]), "Hello");
    }

    #[test]
    fn test_title_truncates_long_message() {
        let text = "a".repeat(45);
        let title = derive_title(&[Message::user(text)]);
        assert_eq!(title, format!("{}…", "a".repeat(40)));
    }

    #[test]
    fn test_title_exactly_forty_chars_untouched() {
        let text = "b".repeat(40);
        assert_eq!(derive_title(&[Message::user(text.clone())]), text);
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        let text = "é".repeat(41);
        assert_eq!(derive_title(&[Message::user(text)]), format!("{}…", "é".repeat(40)));
    }

    #[test]
    fn test_title_without_user_message() {
        assert_eq!(derive_title(&[Message::assistant("Welcome")]), "Chat");
        assert_eq!(derive_title(&[]), "Chat");
    }

    #[test]
    fn test_title_skips_leading_assistant_message() {
        let msgs = [Message::assistant("Welcome"), Message::user("Question")];
        assert_eq!(derive_title(&msgs), "Question");
    }

    #[test]
    fn test_save_once_ignores_empty_conversation() {
        let mut archive = Archive::new();
        let mut conv = Conversation::start_new(Arc::new(MockLlmService::new()));

        assert!(archive.save_once(&mut conv).is_none());
        assert!(archive.list().next().is_none());
        assert!(!conv.is_saved());
    }

    #[test]
    fn test_save_once_snapshots_messages() {
        let mut archive = Archive::new();
        let mut conv = conversation_with("Hello");

        let id = archive.save_once(&mut conv).unwrap();
        conv.append_user_message("later");

        let entry = archive.get(id).unwrap();
        assert_eq!(entry.title(), "Hello");
        assert_eq!(entry.messages().len(), 2);
        assert!(conv.is_saved());
    }

    #[test]
    fn test_list_most_recent_first() {
        let mut archive = Archive::new();
        for title in ["A", "B", "C"] {
            archive.save_once(&mut conversation_with(title));
        }

        let titles: Vec<&str> = archive.list().map(ArchivedConversation::title).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_user_turns_skip_assistant() {
        let mut archive = Archive::new();
        let mut conv = conversation_with("Hi");
        conv.append_user_message("Again");
        let id = archive.save_once(&mut conv).unwrap();

        assert_eq!(archive.get(id).unwrap().user_turns(), vec!["Hi", "Again"]);
    }

    proptest! {
        #[test]
        fn prop_save_once_is_idempotent(text in "[a-zA-Z0-9 ?]{1,80}", repeats in 1usize..10) {
            let mut archive = Archive::new();
            let mut conv = conversation_with(&text);

            let saved: Vec<_> = (0..repeats).filter_map(|_| archive.save_once(&mut conv)).collect();

            prop_assert_eq!(saved.len(), 1);
            prop_assert_eq!(archive.list().count(), 1);
            prop_assert!(conv.is_saved());
        }

        #[test]
        fn prop_guard_stays_set_as_messages_grow(extra in proptest::collection::vec("[a-z]{1,10}", 0..8)) {
            let mut archive = Archive::new();
            let mut conv = conversation_with("first");
            archive.save_once(&mut conv);

            for text in extra {
                conv.append_user_message(text.clone());
                conv.append_assistant_message(text);
                prop_assert!(archive.save_once(&mut conv).is_none());
                prop_assert!(conv.is_saved());
            }
            prop_assert_eq!(archive.list().count(), 1);
        }

        #[test]
        fn prop_title_is_bounded_prefix(text in "\\PC{1,120}") {
            let title = derive_title(&[Message::user(text.clone())]);
            let count = text.chars().count();

            if count > MAX_TITLE_CHARS {
                prop_assert_eq!(title.chars().count(), MAX_TITLE_CHARS + 1);
                prop_assert!(title.ends_with('…'));
                let prefix: String = text.chars().take(MAX_TITLE_CHARS).collect();
                prop_assert!(title.starts_with(&prefix));
            } else {
                prop_assert_eq!(title, text);
            }
        }

        #[test]
        fn prop_list_reverses_save_order(n in 1usize..12) {
            let mut archive = Archive::new();
            let ids: Vec<_> = (0..n)
                .filter_map(|i| archive.save_once(&mut conversation_with(&format!("chat {i}"))))
                .collect();

            let listed: Vec<_> = archive.list().map(ArchivedConversation::id).collect();
            let mut expected = ids;
            expected.reverse();
            prop_assert_eq!(listed, expected);
        }
    }
}
