//! Messages exchanged between agents in a team
//!
//! Every turn of a team run and every tool round trip inside a turn is
//! recorded as an [`AgentMessage`]. Front ends relay these records in the
//! order they were produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of an [`AgentMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Plain text reply
    #[serde(rename = "TextMessage")]
    Text,
    /// The model asked for one tool call
    #[serde(rename = "ToolCallRequestEvent")]
    ToolCallRequest,
    /// A tool call finished
    #[serde(rename = "ToolCallExecutionEvent")]
    ToolCallExecution,
    /// Tool output returned as the agent's final reply, without reflection
    #[serde(rename = "ToolCallSummaryMessage")]
    ToolCallSummary,
}

impl MessageKind {
    /// Wire name of this kind
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "TextMessage",
            MessageKind::ToolCallRequest => "ToolCallRequestEvent",
            MessageKind::ToolCallExecution => "ToolCallExecutionEvent",
            MessageKind::ToolCallSummary => "ToolCallSummaryMessage",
        }
    }

    /// Whether this kind can end an agent's turn
    pub fn is_final(self) -> bool {
        matches!(self, MessageKind::Text | MessageKind::ToolCallSummary)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message produced during a team run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Name of the agent (or `"user"`) that produced the message
    pub source: String,
    /// What kind of message this is
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Message payload; plain text is stored as a JSON string
    pub content: Value,
    /// When the message was produced
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    /// Create a message of the given kind stamped with the current time
    pub fn new(source: impl Into<String>, kind: MessageKind, content: Value) -> Self {
        Self {
            source: source.into(),
            kind,
            content,
            timestamp: Utc::now(),
        }
    }

    /// Plain text message
    pub fn text(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(source, MessageKind::Text, Value::String(text.into()))
    }

    /// Tool call request event
    pub fn tool_call_request(source: impl Into<String>, call: Value) -> Self {
        Self::new(source, MessageKind::ToolCallRequest, call)
    }

    /// Tool call execution event
    pub fn tool_call_execution(source: impl Into<String>, result: Value) -> Self {
        Self::new(source, MessageKind::ToolCallExecution, result)
    }

    /// Tool output used as the final reply of a turn
    pub fn tool_call_summary(source: impl Into<String>, summary: impl Into<String>) -> Self {
        Self::new(
            source,
            MessageKind::ToolCallSummary,
            Value::String(summary.into()),
        )
    }

    /// Content rendered as text; JSON payloads are serialized
    pub fn content_text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the text content contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.content_text().contains(needle)
    }
}
