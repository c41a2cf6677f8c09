//! Bridge from executor callbacks to agent messages

use crate::executor::ExecutorEventHandler;
use agent_core::{AgentMessage, EventSink};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Turns tool callbacks into `ToolCallRequestEvent` and
/// `ToolCallExecutionEvent` messages on an [`EventSink`]
pub struct MessageForwarder {
    source: String,
    sink: EventSink,
}

impl MessageForwarder {
    /// Forward events of the agent named `source` into `sink`
    pub fn new(source: impl Into<String>, sink: EventSink) -> Self {
        Self {
            source: source.into(),
            sink,
        }
    }

    fn send(&self, message: AgentMessage) {
        if self.sink.send(message).is_err() {
            tracing::debug!(source = %self.source, "Event receiver dropped");
        }
    }
}

#[async_trait]
impl ExecutorEventHandler for MessageForwarder {
    async fn on_tool_start(&self, id: &str, name: &str, input: &Value) {
        self.send(AgentMessage::tool_call_request(
            self.source.clone(),
            json!({ "id": id, "name": name, "arguments": input }),
        ));
    }

    async fn on_tool_done(
        &self,
        id: &str,
        name: &str,
        result: std::result::Result<&Value, &str>,
        duration_ms: u64,
    ) {
        let (content, is_error) = match result {
            Ok(value) => (value.clone(), false),
            Err(error) => (Value::String(error.to_string()), true),
        };
        self.send(AgentMessage::tool_call_execution(
            self.source.clone(),
            json!({
                "call_id": id,
                "name": name,
                "content": content,
                "is_error": is_error,
                "duration_ms": duration_ms,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::MessageKind;

    #[tokio::test]
    async fn test_forwards_request_and_execution() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let forwarder = MessageForwarder::new("Plotting_Agent", tx);

        forwarder
            .on_tool_start("call_1", "analyze_stock", &json!({"ticker": "TSLA"}))
            .await;
        forwarder
            .on_tool_done("call_1", "analyze_stock", Err("Error: no data"), 12)
            .await;

        let request = rx.recv().await.unwrap();
        assert_eq!(request.kind, MessageKind::ToolCallRequest);
        assert_eq!(request.content["arguments"]["ticker"], "TSLA");

        let execution = rx.recv().await.unwrap();
        assert_eq!(execution.kind, MessageKind::ToolCallExecution);
        assert_eq!(execution.source, "Plotting_Agent");
        assert_eq!(execution.content["is_error"], true);
        assert_eq!(execution.content["content"], "Error: no data");
    }
}
