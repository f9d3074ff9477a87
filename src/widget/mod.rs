//! Chat widget: input, mode toggle, send action and conversation log.
//!
//! # Structure
//!
//! - [`controller`]: [`ChatWidget`], the submit-and-render loop
//! - [`log`]: [`ConversationLog`] and its loading placeholder
//! - [`render`]: escaping and answer/citation markup

pub mod controller;
pub mod log;
pub mod render;

pub use controller::{ChatInput, ChatWidget, ModeToggle, SendOutcome};
pub use log::{Body, ConversationLog, EntryId, LogEntry, LogView, PendingReply, Role};

/// Placeholder shown while a request is in flight.
pub const LOADING_TEXT: &str = "Thinking...";

/// Shown when the server replied without an answer.
pub const GENERIC_ERROR_TEXT: &str = "Sorry, I encountered an error.";

/// Shown when the request or the response body failed.
pub const NETWORK_ERROR_TEXT: &str = "Network error. Please try again.";
