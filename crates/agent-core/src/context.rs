//! Per-run values handed to every agent turn
//!
//! A [`Context`] identifies the task, tracks the turn a team is on and, when a
//! caller wants live progress, carries the channel agents report their
//! intermediate messages into (tool calls and tool results).

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedSender;

use crate::AgentMessage;

/// Channel that receives intermediate agent messages as they happen
pub type EventSink = UnboundedSender<AgentMessage>;

/// ```
/// use agent_core::Context;
///
/// let mut ctx = Context::new().with_task_id("3f1c").with_output_dir("./output");
/// ctx.set_turn(2);
///
/// assert_eq!(ctx.task_id(), Some("3f1c"));
/// assert_eq!(ctx.turn(), Some(2));
/// assert!(!ctx.emit(agent_core::AgentMessage::text("Search_Agent", "found it")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    task_id: Option<String>,
    output_dir: Option<PathBuf>,
    turn: Option<usize>,
    events: Option<EventSink>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Directory generated artifacts are written to
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Zero-based turn within a team run; unset outside a team
    pub fn turn(&self) -> Option<usize> {
        self.turn
    }

    pub fn set_turn(&mut self, turn: usize) {
        self.turn = Some(turn);
    }

    pub fn event_sink(&self) -> Option<&EventSink> {
        self.events.as_ref()
    }

    /// Report an intermediate message
    ///
    /// Returns `false` when no sink is attached or the receiver is gone.
    pub fn emit(&self, message: AgentMessage) -> bool {
        self.events
            .as_ref()
            .is_some_and(|sink| sink.send(message).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_values() {
        let mut ctx = Context::new()
            .with_task_id("task-1")
            .with_output_dir("./output");
        assert_eq!(ctx.turn(), None);
        ctx.set_turn(3);

        assert_eq!(ctx.task_id(), Some("task-1"));
        assert_eq!(ctx.output_dir(), Some(Path::new("./output")));
        assert_eq!(ctx.turn(), Some(3));
    }

    #[tokio::test]
    async fn test_emit_reaches_sink() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let ctx = Context::new().with_event_sink(tx);

        assert!(ctx.emit(AgentMessage::text("Plotting_Agent", "chart ready")));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.source, "Plotting_Agent");
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let ctx = Context::new().with_event_sink(tx);
        assert!(!ctx.emit(AgentMessage::text("a", "b")));
    }
}
