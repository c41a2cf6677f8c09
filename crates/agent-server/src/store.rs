//! In-memory task records
//!
//! Each task moves `created → running → completed | failed`. A record is
//! mutated only by the recorder of its run. Readers take snapshots, and
//! stream subscribers get every change on the task's broadcast channel.

use agent_core::{AgentMessage, MessageKind};
use agent_team::TaskResult;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::events::{StreamEvent, agent_event};

const EVENT_CAPACITY: usize = 256;

/// Progress reported once a run has started
pub const STARTED_PROGRESS: f64 = 0.1;

/// Lifecycle state of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Running,
    Completed,
    Failed,
}

/// One recorded message of a run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentOutput {
    pub agent: String,
    pub kind: MessageKind,
    pub content: Value,
    pub timestamp: DateTime<Utc>,
}

impl AgentOutput {
    pub fn from_message(message: AgentMessage) -> Self {
        Self {
            agent: message.source,
            kind: message.kind,
            content: message.content,
            timestamp: message.timestamp,
        }
    }

    /// Content as text; JSON payloads are serialized
    pub fn content_text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Summary of a completed run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskResults {
    pub task_id: String,
    pub task_description: String,
    pub final_result: String,
    pub stop_reason: String,
    pub completed_at: DateTime<Utc>,
}

/// Point-in-time copy of a task record
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskSnapshot {
    pub id: String,
    pub task: String,
    pub status: TaskStatus,
    pub progress: f64,
    pub agents_output: Vec<AgentOutput>,
    pub results: Option<TaskResults>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a new stream subscriber receives
pub struct Subscription {
    /// Events already recorded, ending with the terminal one if the run is over
    pub replay: Vec<StreamEvent>,
    /// Live events, absent once the run is over
    pub live: Option<broadcast::Receiver<StreamEvent>>,
    /// Whether this subscriber moved the task to `running`
    pub started: bool,
}

struct TaskEntry {
    record: TaskSnapshot,
    events: broadcast::Sender<StreamEvent>,
}

impl TaskEntry {
    fn touch(&mut self) {
        self.record.updated_at = Utc::now();
    }

    fn publish(&self, event: StreamEvent) {
        // No receivers just means nobody is watching
        let _ = self.events.send(event);
    }
}

/// Progress after `n` recorded messages
pub fn progress_after(n: usize) -> f64 {
    (STARTED_PROGRESS + 0.2 * n as f64).min(0.9)
}

/// Message sent on the `done` event
pub const DONE_MESSAGE: &str = "All agents have finished";

/// Concurrent map of task records
#[derive(Clone, Default)]
pub struct TaskStore {
    tasks: Arc<DashMap<String, TaskEntry>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task in status `created` and return its id
    pub fn create(&self, task: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let record = TaskSnapshot {
            id: id.clone(),
            task: task.into(),
            status: TaskStatus::Created,
            progress: 0.0,
            agents_output: Vec::new(),
            results: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.insert(id.clone(), TaskEntry { record, events });
        id
    }

    pub fn get(&self, id: &str) -> Option<TaskSnapshot> {
        self.tasks.get(id).map(|entry| entry.record.clone())
    }

    /// Snapshots of every task, oldest first
    pub fn list(&self) -> Vec<TaskSnapshot> {
        let mut tasks: Vec<_> = self.tasks.iter().map(|e| e.record.clone()).collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Attach a stream subscriber, starting the task if it has not started
    ///
    /// Replay and subscription happen under the record's lock, so every event
    /// reaches the subscriber exactly once.
    pub fn subscribe(&self, id: &str, output_dir: &Path) -> Option<Subscription> {
        let mut entry = self.tasks.get_mut(id)?;

        let started = entry.record.status == TaskStatus::Created;
        if started {
            entry.record.status = TaskStatus::Running;
            entry.record.progress = STARTED_PROGRESS;
            entry.touch();
        }

        let mut replay: Vec<_> = entry
            .record
            .agents_output
            .iter()
            .map(|output| agent_event(output, output_dir))
            .collect();

        let live = match entry.record.status {
            TaskStatus::Completed => {
                replay.push(StreamEvent::Done {
                    message: DONE_MESSAGE.to_string(),
                });
                None
            }
            TaskStatus::Failed => {
                replay.push(failure_event(entry.record.error.as_deref().unwrap_or_default()));
                None
            }
            TaskStatus::Created | TaskStatus::Running => Some(entry.events.subscribe()),
        };

        Some(Subscription {
            replay,
            live,
            started,
        })
    }

    /// Append a message of a running task
    pub(crate) fn record_output(&self, id: &str, message: AgentMessage, output_dir: &Path) {
        let Some(mut entry) = self.tasks.get_mut(id) else {
            return;
        };
        let output = AgentOutput::from_message(message);
        let event = agent_event(&output, output_dir);
        entry.record.agents_output.push(output);
        entry.record.progress = progress_after(entry.record.agents_output.len());
        entry.touch();
        entry.publish(event);
    }

    /// Mark a task completed with the result of its run
    pub(crate) fn complete(&self, id: &str, result: &TaskResult) {
        let Some(mut entry) = self.tasks.get_mut(id) else {
            return;
        };
        let final_result = result
            .final_message()
            .map(AgentMessage::content_text)
            .unwrap_or_default();
        entry.record.results = Some(TaskResults {
            task_id: id.to_string(),
            task_description: entry.record.task.clone(),
            final_result,
            stop_reason: result.stop_reason.clone(),
            completed_at: Utc::now(),
        });
        entry.record.status = TaskStatus::Completed;
        entry.record.progress = 1.0;
        entry.touch();
        entry.publish(StreamEvent::Done {
            message: DONE_MESSAGE.to_string(),
        });
    }

    /// Mark a task failed
    pub(crate) fn fail(&self, id: &str, error: &str) {
        let Some(mut entry) = self.tasks.get_mut(id) else {
            return;
        };
        entry.record.status = TaskStatus::Failed;
        entry.record.error = Some(error.to_string());
        entry.touch();
        entry.publish(failure_event(error));
    }
}

fn failure_event(error: &str) -> StreamEvent {
    StreamEvent::Error {
        message: format!("Task failed: {error}"),
    }
}
