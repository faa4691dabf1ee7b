//! Conversation session lifecycle
//!
//! A session owns the conversation on screen and the archive of saved ones.
//! All changes go through [`SessionController::dispatch`].

mod archive;
mod context;
mod controller;
mod conversation;
mod event;
mod message;

#[cfg(test)]
pub mod testing;

pub use archive::ArchiveId;
pub use controller::{
    SessionController, SessionError, SessionState, Transition, TransitionResult,
    DEFAULT_TEMPERATURE,
};
pub use conversation::Reply;
pub use event::Event;
pub use message::Message;
