//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the tool-calling loop:
//! 1. Call LLM with conversation history and available tools
//! 2. Check stop reason
//! 3. If tool use requested, execute tools; then either loop back so the
//!    model can reflect on the results, or end the turn with the raw tool
//!    output when reflection is disabled
//! 4. If completed, return final response

use agent_core::{MessageKind, Result};
use agent_llm::{
    CompletionRequest, LLMProvider, Message, StopReason, TokenUsage, ToolDefinition,
};
use agent_tools::ToolRegistry;
use agent_utils::preview;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Event handler for agent execution events
///
/// Implement this trait to receive callbacks during agent execution,
/// useful for streaming tool call status to clients.
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// Called when a tool execution starts
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// Called when a tool execution completes
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&Value, &str>,
        _duration_ms: u64,
    ) {
    }

    /// Called when the agent completes
    async fn on_complete(&self, _result: &str) {}

    /// Called when an error occurs
    async fn on_error(&self, _error: &str) {}
}

/// No-op event handler for when events are not needed
pub struct NoOpEventHandler;

#[async_trait]
impl ExecutorEventHandler for NoOpEventHandler {}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of iterations (prevents infinite loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,

    /// Call the model again after tools ran
    ///
    /// When false, the turn ends right after the first tool round and its
    /// output becomes the reply, tagged [`MessageKind::ToolCallSummary`].
    pub reflect_on_tool_use: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.7),
            reflect_on_tool_use: true,
        }
    }
}

/// Final result of one executor run
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorOutput {
    /// Reply text, or the tool output for a summary
    pub text: String,
    /// `Text` or `ToolCallSummary`
    pub kind: MessageKind,
    /// Model calls made
    pub iterations: usize,
    /// Tokens used across all model calls
    pub usage: TokenUsage,
}

impl ExecutorOutput {
    fn reply(text: impl Into<String>, iterations: usize, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Text,
            iterations,
            usage,
        }
    }
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: None,
        }
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Execute the agent loop with a user query
    pub async fn run(&self, user_message: String) -> Result<String> {
        let output = self
            .execute(vec![Message::user(user_message)], self.event_handler.clone())
            .await?;
        Ok(output.text)
    }

    /// Execute the agent loop with conversation history
    pub async fn run_with_history(
        &self,
        user_message: String,
        history: Vec<Message>,
    ) -> Result<String> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));
        let output = self
            .execute(conversation, self.event_handler.clone())
            .await?;
        Ok(output.text)
    }

    /// Run the loop over a prepared conversation with an optional per-call handler
    ///
    /// The handler overrides the one set with [`AgentExecutor::with_event_handler`].
    pub async fn execute(
        &self,
        initial_conversation: Vec<Message>,
        handler: Option<Arc<dyn ExecutorEventHandler>>,
    ) -> Result<ExecutorOutput> {
        let handler = handler.or_else(|| self.event_handler.clone());
        let result = self.run_loop(initial_conversation, handler.as_ref()).await;

        if let Some(handler) = &handler {
            match &result {
                Ok(output) => handler.on_complete(&output.text).await,
                Err(e) => handler.on_error(&e.to_string()).await,
            }
        }
        result
    }

    async fn run_loop(
        &self,
        mut conversation: Vec<Message>,
        event_handler: Option<&Arc<dyn ExecutorEventHandler>>,
    ) -> Result<ExecutorOutput> {
        let tools = self.build_tool_definitions();
        let mut usage = TokenUsage::default();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                warn!(
                    max_iterations = self.config.max_iterations,
                    "Max iterations reached, stopping"
                );
                return Ok(ExecutorOutput::reply(
                    "Max iterations reached without completion",
                    iteration - 1,
                    usage,
                ));
            }

            if let Some(last_msg) = conversation.last() {
                debug!(
                    role = ?last_msg.role,
                    message_preview = %preview(last_msg.text().unwrap_or(""), 200),
                    "Processing message"
                );
            }

            info!(
                iteration,
                model = %self.config.model,
                tool_count = tools.len(),
                "Sending request to LLM"
            );

            let mut request_builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .system(
                    self.config
                        .system_prompt
                        .clone()
                        .unwrap_or_else(|| "You are a helpful assistant.".to_string()),
                )
                .max_tokens(self.config.max_tokens);
            if let Some(temperature) = self.config.temperature {
                request_builder = request_builder.temperature(temperature);
            }
            if !tools.is_empty() {
                request_builder = request_builder.tools(tools.clone());
            }

            let response = self
                .provider
                .complete(request_builder.build())
                .await
                .map_err(|e| agent_core::Error::ProcessingFailed(e.to_string()))?;
            usage += response.usage;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );
            debug!(response_preview = %preview(response.text(), 300), "LLM response content preview");

            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn | StopReason::StopSequence => {
                    let text = response.text().to_string();
                    info!(iteration, response_length = text.len(), "Agent completed naturally");
                    return Ok(ExecutorOutput::reply(text, iteration, usage));
                }

                StopReason::ToolUse => {
                    let tool_results = self
                        .execute_tools(&response.message, event_handler)
                        .await;

                    if tool_results.is_empty() {
                        warn!("No tool results despite ToolUse stop reason");
                        return Ok(ExecutorOutput::reply(
                            "Tool execution failed",
                            iteration,
                            usage,
                        ));
                    }

                    if !self.config.reflect_on_tool_use {
                        let summary = tool_results
                            .iter()
                            .flat_map(Message::tool_results)
                            .map(|(_, content, _)| content)
                            .collect::<Vec<_>>()
                            .join("\n");
                        info!(
                            result_count = tool_results.len(),
                            "Ending turn with tool output (no reflection)"
                        );
                        return Ok(ExecutorOutput {
                            text: summary,
                            kind: MessageKind::ToolCallSummary,
                            iterations: iteration,
                            usage,
                        });
                    }

                    debug!(
                        result_count = tool_results.len(),
                        "Tool execution completed, continuing agent loop"
                    );
                    conversation.extend(tool_results);
                }

                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    let text = response.text();
                    let text = if text.is_empty() {
                        "Response truncated due to token limit"
                    } else {
                        text
                    };
                    return Ok(ExecutorOutput::reply(text, iteration, usage));
                }
            }
        }
    }

    /// Build tool definitions from the registry
    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Execute tool calls from an assistant message
    ///
    /// Failures, including unknown tools, become error results the model can read.
    async fn execute_tools(
        &self,
        message: &Message,
        event_handler: Option<&Arc<dyn ExecutorEventHandler>>,
    ) -> Vec<Message> {
        let mut results = Vec::new();

        for (id, name, input) in message.tool_uses() {

            info!(
                tool_name = %name,
                tool_id = %id,
                input_preview = %preview(&input.to_string(), 500),
                "Executing tool"
            );

            if let Some(handler) = event_handler {
                handler.on_tool_start(id, name, input).await;
            }

            let start_time = std::time::Instant::now();
            let outcome = match self.tool_registry.get(name) {
                Some(tool) => tool.execute(input.clone()).await,
                None => Err(agent_core::Error::ProcessingFailed(format!(
                    "Tool not found: {name}"
                ))),
            };
            let duration_ms = start_time.elapsed().as_millis() as u64;

            match outcome {
                Ok(result) => {
                    let result_str = match &result {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    info!(
                        tool_name = %name,
                        duration_ms,
                        result_length = result_str.len(),
                        result_preview = %preview(&result_str, 500),
                        "Tool execution succeeded"
                    );

                    if let Some(handler) = event_handler {
                        handler.on_tool_done(id, name, Ok(&result), duration_ms).await;
                    }
                    results.push(Message::tool_result(id, result_str, false));
                }
                Err(e) => {
                    let error_str = format!("Error: {e}");
                    warn!(tool_name = %name, duration_ms, error = %e, "Tool execution failed");

                    if let Some(handler) = event_handler {
                        handler
                            .on_tool_done(id, name, Err(&error_str), duration_ms)
                            .await;
                    }
                    results.push(Message::tool_result(id, error_str, true));
                }
            }
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Enable or disable reflection after tool calls
    pub fn reflect_on_tool_use(mut self, reflect: bool) -> Self {
        self.config.reflect_on_tool_use = reflect;
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            agent_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentExecutor::new(
            provider,
            self.tool_registry,
            self.config,
        ))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
