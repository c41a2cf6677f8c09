//! Round-robin team definition and execution

use crate::{TaskResult, TeamEvent, TerminationCondition};
use agent_core::{Agent, AgentMessage, Context, Error, Result, SharedMemory};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info};

/// Turn budget used when none is configured
pub const DEFAULT_MAX_TURNS: usize = 5;

/// Source name of the task message
pub const USER_SOURCE: &str = "user";

/// A team whose agents speak in fixed cyclic order
///
/// Each turn the next agent receives the shared transcript, whose newest
/// entry is its input, and its reply is appended to the transcript. The
/// run stops when the termination condition fires on a reply or after
/// `max_turns` turns.
///
/// # Example
///
/// ```no_run
/// use agent_team::{RoundRobinTeam, TextMentionTermination};
/// use agent_core::Agent;
/// use std::sync::Arc;
///
/// # async fn example(search: Arc<dyn Agent>, report: Arc<dyn Agent>) -> agent_core::Result<()> {
/// let team = RoundRobinTeam::builder()
///     .agent(search)
///     .agent(report)
///     .termination(TextMentionTermination::default())
///     .max_turns(5)
///     .build()?;
///
/// let result = team.run("Analyze Kweichow Moutai").await?;
/// println!("{}", result.stop_reason);
/// # Ok(())
/// # }
/// ```
pub struct RoundRobinTeam {
    agents: Vec<Arc<dyn Agent>>,
    memory: SharedMemory,
    max_turns: usize,
    termination: Option<Arc<dyn TerminationCondition>>,
}

impl RoundRobinTeam {
    /// Create a new team builder
    pub fn builder() -> RoundRobinTeamBuilder {
        RoundRobinTeamBuilder::new()
    }

    /// Names of the participants in turn order
    pub fn participants(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name()).collect()
    }

    /// The transcript shared by all participants
    pub fn memory(&self) -> &SharedMemory {
        &self.memory
    }

    /// Turn budget per run
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Run a task to completion without observing intermediate events
    pub async fn run(&self, task: &str) -> Result<TaskResult> {
        self.run_with_context(task, Context::new()).await
    }

    /// Run a task, reporting every message on the context's event sink
    ///
    /// The sink receives the task message, the tool events of each turn and
    /// each turn's reply, in that order.
    pub async fn run_with_context(&self, task: &str, mut context: Context) -> Result<TaskResult> {
        let task_message = AgentMessage::text(USER_SOURCE, task);
        self.memory.push(task_message.clone()).await;
        context.emit(task_message.clone());

        let mut messages = vec![task_message];
        let mut stop_reason = None;

        for turn in 0..self.max_turns {
            let agent = &self.agents[turn % self.agents.len()];
            context.set_turn(turn);
            info!(
                task_id = context.task_id().unwrap_or("-"),
                turn,
                agent = agent.name(),
                "Turn started"
            );

            let transcript = self.memory.snapshot().await;
            let reply = agent.respond(&transcript, &mut context).await.map_err(|e| {
                error!(turn, agent = agent.name(), error = %e, "Agent failed");
                Error::TeamAborted(format!("{} failed on turn {}: {e}", agent.name(), turn + 1))
            })?;

            self.memory.push(reply.clone()).await;
            context.emit(reply.clone());
            messages.push(reply);

            let last = &messages[messages.len() - 1];
            if let Some(reason) = self.termination.as_ref().and_then(|t| t.check(last)) {
                stop_reason = Some(reason);
                break;
            }
        }

        let stop_reason = stop_reason
            .unwrap_or_else(|| format!("Maximum number of turns {} reached.", self.max_turns));
        info!(
            task_id = context.task_id().unwrap_or("-"),
            turns = messages.len() - 1,
            stop_reason = %stop_reason,
            "Team run finished"
        );

        Ok(TaskResult {
            messages,
            stop_reason,
        })
    }

    /// Run a task in the background and stream its events
    ///
    /// The stream yields [`TeamEvent::Message`] items as they happen and
    /// ends with one [`TeamEvent::Completed`], or with an error if an agent
    /// failed.
    pub fn run_stream(
        self: Arc<Self>,
        task: impl Into<String>,
        context: Context,
    ) -> impl Stream<Item = Result<TeamEvent>> + Send + 'static {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = task.into();
        let handle = tokio::spawn(async move {
            self.run_with_context(&task, context.with_event_sink(tx))
                .await
        });

        let messages = UnboundedReceiverStream::new(rx).map(|m| Ok(TeamEvent::Message(m)));
        let completion = futures::stream::once(async move {
            match handle.await {
                Ok(Ok(result)) => Ok(TeamEvent::Completed(result)),
                Ok(Err(e)) => Err(e),
                Err(join_error) => Err(Error::TeamAborted(join_error.to_string())),
            }
        });
        messages.chain(completion)
    }
}

/// Builder for constructing teams
pub struct RoundRobinTeamBuilder {
    agents: Vec<Arc<dyn Agent>>,
    memory: Option<SharedMemory>,
    max_turns: usize,
    termination: Option<Arc<dyn TerminationCondition>>,
}

impl RoundRobinTeamBuilder {
    /// Create a new team builder
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            memory: None,
            max_turns: DEFAULT_MAX_TURNS,
            termination: None,
        }
    }

    /// Add a participant; turn order follows insertion order
    pub fn agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    /// Share an existing transcript
    pub fn memory(mut self, memory: SharedMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Set the turn budget
    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Stop early when `condition` fires
    pub fn termination(mut self, condition: impl TerminationCondition + 'static) -> Self {
        self.termination = Some(Arc::new(condition));
        self
    }

    /// Build the team
    pub fn build(self) -> Result<RoundRobinTeam> {
        if self.agents.is_empty() {
            return Err(Error::InitializationFailed(
                "a team needs at least one agent".to_string(),
            ));
        }
        if self.max_turns == 0 {
            return Err(Error::InitializationFailed(
                "max_turns must be at least 1".to_string(),
            ));
        }

        Ok(RoundRobinTeam {
            agents: self.agents,
            memory: self.memory.unwrap_or_default(),
            max_turns: self.max_turns,
            termination: self.termination,
        })
    }
}

impl Default for RoundRobinTeamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextMentionTermination;
    use agent_core::MessageKind;
    use async_trait::async_trait;
    use serde_json::json;

    /// Replies with a fixed text and reports one tool call first
    struct Scripted {
        name: &'static str,
        reply: &'static str,
        with_tool_event: bool,
    }

    #[async_trait]
    impl Agent for Scripted {
        async fn process(&self, _input: String, _context: &mut Context) -> Result<String> {
            Ok(self.reply.to_string())
        }

        fn name(&self) -> &str {
            self.name
        }

        async fn respond(
            &self,
            transcript: &[AgentMessage],
            context: &mut Context,
        ) -> Result<AgentMessage> {
            if self.with_tool_event {
                context.emit(AgentMessage::tool_call_request(
                    self.name,
                    json!({"name": "web_search", "seen": transcript.len()}),
                ));
            }
            Ok(AgentMessage::text(self.name, self.reply))
        }
    }

    struct Failing;

    #[async_trait]
    impl Agent for Failing {
        async fn process(&self, _input: String, _context: &mut Context) -> Result<String> {
            Err(Error::ProcessingFailed("model unreachable".to_string()))
        }

        fn name(&self) -> &str {
            "Broken_Agent"
        }
    }

    fn scripted(name: &'static str, reply: &'static str) -> Arc<dyn Agent> {
        Arc::new(Scripted {
            name,
            reply,
            with_tool_event: false,
        })
    }

    #[test]
    fn test_builder_validation() {
        assert!(RoundRobinTeam::builder().build().is_err());
        assert!(
            RoundRobinTeam::builder()
                .agent(scripted("a", "x"))
                .max_turns(0)
                .build()
                .is_err()
        );
        let team = RoundRobinTeam::builder()
            .agent(scripted("a", "x"))
            .build()
            .unwrap();
        assert_eq!(team.max_turns(), DEFAULT_MAX_TURNS);
    }

    #[tokio::test]
    async fn test_cycles_agents_until_turn_budget() {
        let team = RoundRobinTeam::builder()
            .agent(scripted("A", "a"))
            .agent(scripted("B", "b"))
            .termination(TextMentionTermination::default())
            .max_turns(5)
            .build()
            .unwrap();

        let result = team.run("task").await.unwrap();
        let sources: Vec<_> = result.messages.iter().map(|m| m.source.as_str()).collect();
        assert_eq!(sources, vec!["user", "A", "B", "A", "B", "A"]);
        assert_eq!(result.stop_reason, "Maximum number of turns 5 reached.");
        assert_eq!(team.memory().len().await, 6);
    }

    #[tokio::test]
    async fn test_stops_on_termination_text() {
        let team = RoundRobinTeam::builder()
            .agent(scripted("Search_Agent", "AAPL"))
            .agent(scripted("Report_Agent", "report\nTERMINATE"))
            .agent(scripted("OutputAgent", "saved"))
            .termination(TextMentionTermination::default())
            .build()
            .unwrap();

        let result = team.run("analyze apple").await.unwrap();
        assert_eq!(result.messages.len(), 3);
        assert_eq!(result.stop_reason, "Text 'TERMINATE' mentioned");
        assert_eq!(result.final_message().unwrap().source, "Report_Agent");
    }

    #[tokio::test]
    async fn test_agent_failure_aborts_run() {
        let team = RoundRobinTeam::builder()
            .agent(scripted("A", "a"))
            .agent(Arc::new(Failing))
            .build()
            .unwrap();

        let err = team.run("task").await.unwrap_err();
        assert!(matches!(err, Error::TeamAborted(_)));
        assert!(err.to_string().contains("Broken_Agent failed on turn 2"));
    }

    #[tokio::test]
    async fn test_stream_orders_events_and_ends_with_result() {
        let team = Arc::new(
            RoundRobinTeam::builder()
                .agent(Arc::new(Scripted {
                    name: "Search_Agent",
                    reply: "TSLA",
                    with_tool_event: true,
                }))
                .agent(scripted("Report_Agent", "TERMINATE"))
                .termination(TextMentionTermination::default())
                .build()
                .unwrap(),
        );

        let events: Vec<_> = team
            .run_stream("analyze tesla", Context::new().with_task_id("t-1"))
            .collect()
            .await;

        let kinds: Vec<_> = events
            .iter()
            .map(|e| match e {
                Ok(TeamEvent::Message(m)) => format!("{}:{}", m.source, m.kind),
                Ok(TeamEvent::Completed(r)) => format!("done:{}", r.stop_reason),
                Err(e) => format!("err:{e}"),
            })
            .collect();

        assert_eq!(
            kinds,
            vec![
                format!("user:{}", MessageKind::Text),
                format!("Search_Agent:{}", MessageKind::ToolCallRequest),
                format!("Search_Agent:{}", MessageKind::Text),
                format!("Report_Agent:{}", MessageKind::Text),
                "done:Text 'TERMINATE' mentioned".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_reports_failure_last() {
        let team = Arc::new(
            RoundRobinTeam::builder()
                .agent(Arc::new(Failing))
                .build()
                .unwrap(),
        );

        let events: Vec<_> = team.run_stream("task", Context::new()).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(TeamEvent::Message(_))));
        assert!(events[1].is_err());
    }
}
