//! Wire types of the chat endpoint.
//!
//! The request is `{ "query": string, "bangla_mode"?: bool }`; the reply is
//! `{ "answer": string, "sources"?: [{ "id": string|number, "title": string }] }`.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Request
// =============================================================================

/// Body of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The trimmed user query.
    pub query: String,
    /// Explain-in-Bangla mode. Omitted when mode support is off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bangla_mode: Option<bool>,
}

impl ChatRequest {
    /// Request without the mode flag.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            bangla_mode: None,
        }
    }

    /// Request carrying the mode flag.
    pub fn with_mode(query: impl Into<String>, bangla_mode: bool) -> Self {
        Self {
            query: query.into(),
            bangla_mode: Some(bangla_mode),
        }
    }
}

// =============================================================================
// Reply
// =============================================================================

/// Identifier of a cited course material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A citation attached to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub title: String,
}

/// Parsed reply body.
///
/// Every JSON body maps onto this type. A missing or non-string `answer`
/// leaves `answer` empty, which the widget treats as an application failure.
/// Citations are decoration: malformed entries are dropped on their own and
/// never cost the answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    pub answer: Option<String>,
    pub sources: Option<Vec<Source>>,
}

impl ChatReply {
    /// Interpret an arbitrary JSON body.
    pub fn from_value(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(mut body) = value else {
            return Self::default();
        };

        let answer = match body.remove("answer") {
            Some(serde_json::Value::String(answer)) => Some(answer),
            _ => None,
        };

        let sources = match body.remove("sources") {
            Some(serde_json::Value::Array(entries)) => Some(
                entries
                    .into_iter()
                    .filter_map(|entry| match serde_json::from_value::<Source>(entry) {
                        Ok(source) => Some(source),
                        Err(e) => {
                            tracing::debug!(name: "chat.reply.source_dropped", error = %e, "Dropping malformed source entry");
                            None
                        }
                    })
                    .collect(),
            ),
            _ => None,
        };

        Self { answer, sources }
    }

    /// Split into an answer, or `None` when the answer is missing or empty.
    pub fn into_answer(self) -> Option<ChatAnswer> {
        let answer = self.answer.filter(|a| !a.is_empty())?;
        Some(ChatAnswer {
            html: answer,
            sources: self.sources.unwrap_or_default(),
        })
    }
}

/// A successful answer, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    /// Answer markup as returned by the backend.
    pub html: String,
    /// Citations in server order.
    pub sources: Vec<Source>,
}
