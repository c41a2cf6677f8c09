//! Events produced by a team run

use agent_core::AgentMessage;
use serde::Serialize;

/// Outcome of a finished team run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    /// Transcript of the run: the task followed by each turn's reply
    pub messages: Vec<AgentMessage>,
    /// Why the run stopped
    pub stop_reason: String,
}

impl TaskResult {
    /// Reply of the last turn, if any agent spoke
    pub fn final_message(&self) -> Option<&AgentMessage> {
        self.messages.iter().rev().find(|m| m.source != "user")
    }
}

/// Item of a team event stream
///
/// A stream yields any number of `Message` items followed by exactly one
/// `Completed`.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamEvent {
    /// A message, including tool call events inside a turn
    Message(AgentMessage),
    /// The run finished
    Completed(TaskResult),
}
