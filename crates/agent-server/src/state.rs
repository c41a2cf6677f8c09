use agent_core::Context;
use agent_team::{TeamEvent, TeamFactory};
use axum::response::sse::Event;
use futures::StreamExt;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, warn};

use crate::events::StreamEvent;
use crate::store::{TaskSnapshot, TaskStore};

pub type SseStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

/// Error recorded when a task is started without a team factory
pub const NOT_INITIALIZED: &str = "agent team is not initialized";

#[derive(Clone)]
pub struct AppState {
    task_service: Arc<TaskService>,
}

impl AppState {
    pub fn new(factory: Option<Arc<dyn TeamFactory>>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            task_service: Arc::new(TaskService::new(factory, output_dir)),
        }
    }

    pub fn task_service(&self) -> Arc<TaskService> {
        self.task_service.clone()
    }

    pub fn output_dir(&self) -> &Path {
        &self.task_service.output_dir
    }
}

/// Submits tasks and runs them on their first stream subscriber
pub struct TaskService {
    store: TaskStore,
    factory: Option<Arc<dyn TeamFactory>>,
    output_dir: PathBuf,
}

impl TaskService {
    pub fn new(factory: Option<Arc<dyn TeamFactory>>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: TaskStore::new(),
            factory,
            output_dir: output_dir.into(),
        }
    }

    pub fn team_initialized(&self) -> bool {
        self.factory.is_some()
    }

    pub fn submit(&self, task: &str) -> String {
        let id = self.store.create(task);
        info!(task_id = %id, "Task created");
        id
    }

    pub fn status(&self, id: &str) -> Option<TaskSnapshot> {
        self.store.get(id)
    }

    pub fn list(&self) -> Vec<TaskSnapshot> {
        self.store.list()
    }

    pub fn task_count(&self) -> usize {
        self.store.len()
    }

    /// Event stream of a task, or `None` for an unknown id
    ///
    /// The first caller starts the run. Every stream begins with a progress
    /// event, replays what was recorded so far, follows the live run and
    /// closes after the terminal event.
    pub fn event_stream(&self, id: &str) -> Option<SseStream> {
        let subscription = self.store.subscribe(id, &self.output_dir)?;
        if subscription.started {
            self.start_run(id);
        }

        let greeting = StreamEvent::Progress {
            message: format!("Connected to task {id}"),
        };
        let recorded = tokio_stream::iter(
            std::iter::once(greeting).chain(subscription.replay),
        );

        let events: Pin<Box<dyn Stream<Item = StreamEvent> + Send>> = match subscription.live {
            Some(rx) => {
                let live = BroadcastStream::new(rx).filter_map(|event| async move {
                    match event {
                        Ok(event) => Some(event),
                        Err(err) => {
                            warn!(error = %err, "Task event stream lagged");
                            None
                        }
                    }
                });
                Box::pin(recorded.chain(live))
            }
            None => Box::pin(recorded),
        };

        let stream = events
            .scan(false, |finished, event| {
                let next = if *finished {
                    None
                } else {
                    *finished = event.is_terminal();
                    Some(Ok::<_, Infallible>(event.into_sse_event()))
                };
                futures::future::ready(next)
            });
        Some(Box::pin(stream))
    }

    /// Spawn the worker and the recorder of a task that just moved to running
    fn start_run(&self, id: &str) {
        let Some(task) = self.store.get(id).map(|snapshot| snapshot.task) else {
            return;
        };
        let Some(factory) = self.factory.clone() else {
            error!(task_id = %id, "No team factory, failing task");
            self.store.fail(id, NOT_INITIALIZED);
            return;
        };
        let team = match factory.create_team() {
            Ok(team) => Arc::new(team),
            Err(e) => {
                error!(task_id = %id, error = %e, "Failed to create team");
                self.store.fail(id, &e.to_string());
                return;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let context = Context::new()
            .with_task_id(id)
            .with_output_dir(self.output_dir.display().to_string());
        tokio::spawn(async move {
            let mut events = Box::pin(team.run_stream(task, context));
            while let Some(event) = events.next().await {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        let store = self.store.clone();
        let output_dir = self.output_dir.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            info!(task_id = %id, "Task running");
            while let Some(event) = rx.recv().await {
                match event {
                    Ok(TeamEvent::Message(message)) => {
                        store.record_output(&id, message, &output_dir);
                    }
                    Ok(TeamEvent::Completed(result)) => {
                        info!(task_id = %id, stop_reason = %result.stop_reason, "Task completed");
                        store.complete(&id, &result);
                        return;
                    }
                    Err(e) => {
                        error!(task_id = %id, error = %e, "Task failed");
                        store.fail(&id, &e.to_string());
                        return;
                    }
                }
            }
            store.fail(&id, "team stream ended without a result");
        });
    }
}
