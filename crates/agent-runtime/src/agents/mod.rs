//! Concrete agent implementations
//!
//! - SimpleAgent: LLM-only agent without tool execution
//! - ToolAgent: Agent with LLM loop and tool execution capabilities

pub mod simple;
pub mod tool;

pub use simple::{SimpleAgent, SimpleConfig};
pub use tool::ToolAgent;

use agent_core::AgentMessage;
use agent_llm::Message;

/// Turn a team transcript into the conversation seen by agent `own_name`
///
/// The agent's own earlier replies become assistant messages; everything
/// else becomes a user message attributed to its source. Tool events are
/// left out since only final messages carry meaning across turns.
pub fn conversation_from_transcript(own_name: &str, transcript: &[AgentMessage]) -> Vec<Message> {
    transcript
        .iter()
        .filter(|m| m.kind.is_final())
        .map(|m| {
            if m.source == own_name {
                Message::assistant(m.content_text())
            } else {
                Message::user(m.content_text()).with_name(&m.source)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::Role;
    use serde_json::json;

    #[test]
    fn test_conversation_from_transcript() {
        let transcript = vec![
            AgentMessage::text("user", "analyze moutai"),
            AgentMessage::text("Search_Agent", "600519.SS"),
            AgentMessage::tool_call_request("Plotting_Agent", json!({"name": "analyze_stock"})),
            AgentMessage::tool_call_summary("Plotting_Agent", "{\"plot_file_path\": \"a.png\"}"),
        ];

        let conversation = conversation_from_transcript("Search_Agent", &transcript);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation[0].role, Role::User);
        assert_eq!(conversation[0].name.as_deref(), Some("user"));
        assert_eq!(conversation[1].role, Role::Assistant);
        assert_eq!(conversation[1].text(), Some("600519.SS"));
        assert_eq!(conversation[2].name.as_deref(), Some("Plotting_Agent"));
    }
}
