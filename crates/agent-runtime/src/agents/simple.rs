//! Simple agent implementation (LLM only, no tools)

use super::conversation_from_transcript;
use crate::executor::DEFAULT_MODEL;
use agent_core::{Agent, AgentMessage, Context, Result};
use agent_llm::{CompletionRequest, LLMProvider, Message};
use async_trait::async_trait;
use std::sync::Arc;

/// Configuration for a simple agent
#[derive(Debug, Clone)]
pub struct SimpleConfig {
    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for SimpleConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// A simple agent that uses LLM without tools
///
/// Used for team members that only write text, such as the report writer.
pub struct SimpleAgent {
    provider: Arc<dyn LLMProvider>,
    config: SimpleConfig,
    name: String,
    description: String,
}

impl SimpleAgent {
    /// Create a new simple agent
    pub fn new(provider: Arc<dyn LLMProvider>, config: SimpleConfig, name: impl Into<String>) -> Self {
        Self {
            provider,
            config,
            name: name.into(),
            description: String::new(),
        }
    }

    /// Set the description shown when the agent is listed
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Get the agent's configuration
    pub fn config(&self) -> &SimpleConfig {
        &self.config
    }

    async fn complete(&self, conversation: Vec<Message>) -> Result<String> {
        let request = CompletionRequest::builder(&self.config.model)
            .messages(conversation)
            .system(self.config.system_prompt.clone())
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build();

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| agent_core::Error::ProcessingFailed(e.to_string()))?;

        tracing::info!(
            agent = %self.name,
            total_tokens = response.usage.total(),
            "Agent turn finished"
        );
        Ok(response.text().to_string())
    }
}

#[async_trait]
impl Agent for SimpleAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        self.complete(vec![Message::user(input)]).await
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
        _context: &mut Context,
    ) -> Result<AgentMessage> {
        let conversation = conversation_from_transcript(&self.name, transcript);
        let text = self.complete(conversation).await?;
        Ok(AgentMessage::text(self.name.clone(), text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockProvider, text_response};

    #[test]
    fn test_simple_config_default() {
        let config = SimpleConfig::default();
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.system_prompt, "You are a helpful assistant.");
        assert_eq!(config.max_tokens, 4096);
    }

    #[tokio::test]
    async fn test_respond_sends_system_prompt_and_history() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .withf(|req| {
                req.system.as_deref() == Some("Write the report")
                    && req.messages.len() == 3
                    && req.tools.is_none()
            })
            .returning(|_| Ok(text_response("# Report\nTERMINATE")));

        let config = SimpleConfig {
            system_prompt: "Write the report".to_string(),
            ..SimpleConfig::default()
        };
        let agent = SimpleAgent::new(Arc::new(provider), config, "Report_Agent");

        let transcript = vec![
            AgentMessage::text("user", "analyze AAPL"),
            AgentMessage::text("Search_Agent", "AAPL"),
            AgentMessage::tool_call_summary("Plotting_Agent", "{}"),
        ];
        let mut ctx = Context::new();
        let reply = agent.respond(&transcript, &mut ctx).await.unwrap();

        assert_eq!(reply.source, "Report_Agent");
        assert!(reply.mentions("TERMINATE"));
    }
}
