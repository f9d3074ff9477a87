//! Error types for the chat widget.

use thiserror::Error;

/// Errors raised while building the client or talking to the chat endpoint.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL or endpoint path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The endpoint answered with a body that is not JSON.
    #[error("Response body is not JSON (status {status}): {source}")]
    Decode {
        /// HTTP status code of the response.
        status: u16,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Result type alias for widget operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a send did not produce an answer.
///
/// These are the only two failure kinds a user ever sees. Neither escapes the
/// controller: each becomes a fixed assistant message in the log.
#[derive(Error, Debug)]
pub enum ChatFailure {
    /// The server responded, but without an answer.
    #[error("response carried no answer")]
    Application,

    /// The request or the response body failed.
    #[error("transport failure: {0}")]
    Transport(#[from] Error),
}

impl ChatFailure {
    /// Fixed text rendered in the log for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Application => crate::widget::GENERIC_ERROR_TEXT,
            Self::Transport(_) => crate::widget::NETWORK_ERROR_TEXT,
        }
    }
}
