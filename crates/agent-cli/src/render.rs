//! Plain text rendering of team events

use agent_core::AgentMessage;
use agent_stock::Language;
use agent_team::{TaskResult, TeamEvent};

/// Labels printed around each message
struct Labels {
    source: &'static str,
    kind: &'static str,
    stopped: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::English => Labels {
            source: "Source",
            kind: "Type",
            stopped: "Run stopped, reason",
        },
        Language::Chinese => Labels {
            source: "信息来源",
            kind: "信息类型",
            stopped: "流程终止，终止原因",
        },
    }
}

/// Text block for one message: its content, source and kind
pub fn render_message(message: &AgentMessage, language: Language) -> String {
    let labels = labels(language);
    format!(
        "{}\n{}: {}\n{}: {}\n",
        message.content_text(),
        labels.source,
        message.source,
        labels.kind,
        message.kind.as_str()
    )
}

/// Closing line of a run
pub fn render_result(result: &TaskResult, language: Language) -> String {
    format!("{}: {}", labels(language).stopped, result.stop_reason)
}

/// Text for any stream item
pub fn render_event(event: &TeamEvent, language: Language) -> String {
    match event {
        TeamEvent::Message(message) => render_message(message, language),
        TeamEvent::Completed(result) => render_result(result, language),
    }
}
