//! Server-sent events of a task stream

use agent_stock::AgentRole;
use axum::response::sse::Event;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::{Component, Path};

use crate::store::AgentOutput;

/// URL prefix under which the output directory is served
pub const FILES_ROUTE: &str = "/files";

/// One event of a task stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Status text, sent when a client connects
    Progress { message: String },
    /// Output of an agent, named after the front end panel that shows it
    Agent { panel: &'static str, result: String },
    /// The run finished
    Done { message: String },
    /// The run failed
    Error { message: String },
}

#[derive(Serialize)]
struct AgentPayload<'a> {
    status: &'static str,
    result: &'a str,
}

impl StreamEvent {
    /// Whether the stream closes after this event
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }

    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Progress { .. } => "progress",
            StreamEvent::Agent { panel, .. } => *panel,
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// JSON body of the event
    pub fn data(&self) -> Value {
        match self {
            StreamEvent::Progress { message }
            | StreamEvent::Done { message }
            | StreamEvent::Error { message } => json!({ "message": message }),
            StreamEvent::Agent { result, .. } => json!(AgentPayload {
                status: "running",
                result,
            }),
        }
    }

    pub fn into_sse_event(self) -> Event {
        Event::default().event(self.name()).data(self.data().to_string())
    }
}

/// Front end panel for messages from `source`
pub fn panel_for(source: &str) -> &'static str {
    match AgentRole::from_name(source) {
        Some(AgentRole::TaskAnalysis) => "taskAgent",
        Some(AgentRole::Search) => "searchAgent",
        Some(AgentRole::Plotting) => "chartAgent",
        Some(AgentRole::Report | AgentRole::Output) => "commentAgent",
        None => "log",
    }
}

/// URL of a chart written under `output_dir`
///
/// Returns `None` for paths outside the output directory.
pub fn chart_url(plot_path: &str, output_dir: &Path) -> Option<String> {
    let relative = Path::new(plot_path).strip_prefix(output_dir).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if parts.is_empty() {
        return None;
    }
    Some(format!("{FILES_ROUTE}/{}", parts.join("/")))
}

fn plot_file_path(content: &str) -> Option<String> {
    let value: Value = serde_json::from_str(content).ok()?;
    value
        .get("plot_file_path")?
        .as_str()
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Stream event for a recorded agent output
///
/// A chart agent message carrying a chart path is sent as the chart URL.
pub fn agent_event(output: &AgentOutput, output_dir: &Path) -> StreamEvent {
    let panel = panel_for(&output.agent);
    let text = output.content_text();

    let result = if panel == "chartAgent" {
        plot_file_path(&text)
            .and_then(|path| chart_url(&path, output_dir))
            .unwrap_or(text)
    } else {
        text
    };

    StreamEvent::Agent { panel, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentMessage;

    fn output(message: AgentMessage) -> AgentOutput {
        AgentOutput::from_message(message)
    }

    #[test]
    fn test_panels() {
        assert_eq!(panel_for("Task_Analysis_Agent"), "taskAgent");
        assert_eq!(panel_for("Search_Agent"), "searchAgent");
        assert_eq!(panel_for("Plotting_Agent"), "chartAgent");
        assert_eq!(panel_for("Report_Agent"), "commentAgent");
        assert_eq!(panel_for("OutputAgent"), "commentAgent");
        assert_eq!(panel_for("user"), "log");
    }

    #[test]
    fn test_chart_url() {
        let dir = Path::new("./output");
        assert_eq!(
            chart_url("./output/charts/AAPL_20250101_093000.png", dir),
            Some("/files/charts/AAPL_20250101_093000.png".to_string())
        );
        assert_eq!(chart_url("/tmp/elsewhere.png", dir), None);
        assert_eq!(chart_url("./output", dir), None);
    }

    #[test]
    fn test_chart_message_becomes_url() {
        let dir = Path::new("/srv/output");
        let content = json!({
            "stock_code": "0700.HK",
            "plot_file_path": "/srv/output/charts/0700_HK_20250101_093000.png",
        })
        .to_string();
        let event = agent_event(
            &output(AgentMessage::tool_call_summary("Plotting_Agent", content)),
            dir,
        );
        assert_eq!(
            event,
            StreamEvent::Agent {
                panel: "chartAgent",
                result: "/files/charts/0700_HK_20250101_093000.png".to_string(),
            }
        );
    }

    #[test]
    fn test_other_messages_keep_their_text() {
        let dir = Path::new("./output");
        let event = agent_event(&output(AgentMessage::text("Search_Agent", "600519.SS")), dir);
        assert_eq!(event.name(), "searchAgent");
        assert_eq!(event.data(), json!({"status": "running", "result": "600519.SS"}));

        let failed = agent_event(
            &output(AgentMessage::text("Plotting_Agent", "{\"error\": \"no data\"}")),
            dir,
        );
        assert_eq!(
            failed.data()["result"],
            "{\"error\": \"no data\"}"
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(StreamEvent::Done { message: String::new() }.is_terminal());
        assert!(StreamEvent::Error { message: String::new() }.is_terminal());
        assert!(!StreamEvent::Progress { message: String::new() }.is_terminal());
    }
}
