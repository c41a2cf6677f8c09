//! Conversation messages
//!
//! Content is either plain text or a list of blocks, so tool calls and their
//! results travel in the same conversation as text. A message may name the
//! participant that wrote it, which lets several agents share one transcript.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Sent separately by most providers; see `CompletionRequest::system`
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },

    /// A call the assistant asks for
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },

    /// Output of the call with the same id
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,

    /// Participant that wrote the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    fn with_content(role: Role, content: MessageContent) -> Self {
        Self {
            role,
            content: Some(content),
            name: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_content(Role::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_content(Role::Assistant, MessageContent::Text(text.into()))
    }

    /// The answer to tool call `tool_use_id`
    ///
    /// Failed calls are still answered, flagged with `is_error`, so the model
    /// can read what went wrong.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Self::with_content(
            Role::User,
            MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
                is_error: is_error.then_some(true),
            }]),
        )
    }

    /// Attribute the message to a named participant
    ///
    /// Names are reduced to the characters chat APIs accept
    /// (`[A-Za-z0-9_-]`); anything else becomes `_`.
    pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
        let cleaned: String = name
            .as_ref()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.name = (!cleaned.is_empty()).then_some(cleaned);
        self
    }

    fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }

    /// The text of the message, or its first text block
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(s)) => Some(s),
            _ => self.blocks().iter().find_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }

    /// Requested calls as `(id, name, input)`
    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.blocks()
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => Some((id.as_str(), name.as_str(), input)),
                _ => None,
            })
            .collect()
    }

    pub fn has_tool_uses(&self) -> bool {
        self.blocks()
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// Tool results as `(tool_use_id, content, is_error)`
    pub fn tool_results(&self) -> Vec<(&str, &str, bool)> {
        self.blocks()
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => Some((tool_use_id.as_str(), content.as_str(), is_error.unwrap_or(false))),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_messages() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Hello"));
        assert!(msg.tool_uses().is_empty());
        assert_eq!(Message::assistant("Hi").role, Role::Assistant);
    }

    #[test]
    fn test_tool_blocks() {
        let call = Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![
                ContentBlock::Text { text: "Looking it up".to_string() },
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "web_search".to_string(),
                    input: json!({"query": "Moutai ticker"}),
                },
            ])),
            name: None,
        };
        assert!(call.has_tool_uses());
        assert_eq!(call.text(), Some("Looking it up"));
        let uses = call.tool_uses();
        assert_eq!(uses[0].0, "call_1");
        assert_eq!(uses[0].2["query"], "Moutai ticker");

        let ok = Message::tool_result("call_1", "600519.SS", false);
        let failed = Message::tool_result("call_9", "Error: boom", true);
        assert_eq!(ok.tool_results(), [("call_1", "600519.SS", false)]);
        assert_eq!(failed.tool_results(), [("call_9", "Error: boom", true)]);
        assert!(!serde_json::to_string(&ok).unwrap().contains("is_error"));
    }

    #[test]
    fn test_with_name_sanitizes() {
        let msg = Message::user("AAPL").with_name("Search_Agent");
        assert_eq!(msg.name.as_deref(), Some("Search_Agent"));

        let msg = Message::user("x").with_name("report agent.v2");
        assert_eq!(msg.name.as_deref(), Some("report_agent_v2"));

        assert!(Message::user("x").with_name("").name.is_none());
    }

    #[test]
    fn test_unnamed_message_omits_name() {
        let json = serde_json::to_string(&Message::user("Test")).unwrap();
        assert!(!json.contains("\"name\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text(), Some("Test"));
    }
}
