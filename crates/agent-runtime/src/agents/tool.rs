//! Tool agent implementation (wraps AgentExecutor)

use super::conversation_from_transcript;
use crate::events::MessageForwarder;
use crate::executor::{AgentExecutor, ExecutorEventHandler};
use agent_core::{Agent, AgentMessage, Context, Result};
use agent_llm::Message;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// An agent that uses the LLM loop with tool execution
///
/// When the context carries an event sink, every tool call the agent makes
/// is reported on it as it happens.
///
/// # Example
///
/// ```no_run
/// use agent_runtime::AgentRuntime;
/// use agent_core::{Agent, Context};
/// use agent_tools::Tool;
/// use std::sync::Arc;
///
/// # async fn example(runtime: AgentRuntime, search: Arc<dyn Tool>) -> agent_core::Result<()> {
/// let agent = runtime.create_tool_agent(runtime.executor_config(), "Search_Agent", [search]);
///
/// let mut context = Context::new();
/// let response = agent.process("Ticker of Kweichow Moutai?".to_string(), &mut context).await?;
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
    description: String,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
            description: String::new(),
        }
    }

    /// Set the description shown when the agent is listed
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }

    fn forwarder(&self, context: &Context) -> Option<Arc<dyn ExecutorEventHandler>> {
        context.event_sink().map(|sink| {
            Arc::new(MessageForwarder::new(self.name.clone(), sink.clone()))
                as Arc<dyn ExecutorEventHandler>
        })
    }

    async fn run(&self, conversation: Vec<Message>, context: &Context) -> Result<AgentMessage> {
        let output = self
            .executor
            .execute(conversation, self.forwarder(context))
            .await?;
        info!(
            agent = %self.name,
            kind = %output.kind,
            iterations = output.iterations,
            total_tokens = output.usage.total(),
            "Agent turn finished"
        );
        Ok(AgentMessage::new(
            self.name.clone(),
            output.kind,
            Value::String(output.text),
        ))
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let reply = self.run(vec![Message::user(input)], context).await?;
        Ok(reply.content_text())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn respond(
        &self,
        transcript: &[AgentMessage],
        context: &mut Context,
    ) -> Result<AgentMessage> {
        let conversation = conversation_from_transcript(&self.name, transcript);
        self.run(conversation, context).await
    }
}
