//! Course assistant chat widget
//!
//! A client for the course assistant's chat endpoint that keeps the
//! conversation as an HTML-first, inspectable log.
//!
//! # Architecture
//!
//! - **Widget**: controller owning the input, the mode toggle and the log
//! - **Transport**: `ChatTransport` seam with a reqwest implementation that
//!   echoes the CSRF cookie in a header on every request
//! - **Log**: append-only entries, a single loading placeholder per request,
//!   escaping for user text and verbatim markup for answers
//!
//! # Modules
//!
//! - [`widget`]: controller, conversation log and rendering
//! - [`client`]: HTTP transport
//! - [`csrf`]: cookie jar and token lookup
//! - [`protocol`]: request and reply wire types
//! - [`config`]: layered configuration
//!
//! # Example
//!
//! ```rust
//! use coursechat_widget::widget::{ConversationLog, Role};
//!
//! let mut log = ConversationLog::new();
//! log.push_text(Role::User, "<b>hi</b>");
//! assert!(log.to_html().contains("&lt;b&gt;hi&lt;/b&gt;"));
//! ```

pub mod client;
pub mod config;
pub mod csrf;
pub mod error;
pub mod protocol;
pub mod widget;

pub use client::{ChatTransport, HttpChatClient};
pub use error::{ChatFailure, Error, Result};
pub use widget::ChatWidget;
