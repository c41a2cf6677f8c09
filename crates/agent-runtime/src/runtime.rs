//! One model client shared by every agent of a team

use std::sync::Arc;

use agent_core::{Error, Result};
use agent_llm::LLMProvider;
use agent_tools::{Tool, ToolRegistry};
use tracing::debug;

use crate::agents::{SimpleAgent, SimpleConfig, ToolAgent};
use crate::executor::{AgentExecutor, DEFAULT_MODEL, ExecutorConfig};

/// Defaults applied to agents the runtime creates
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub default_max_iterations: usize,
    pub default_model: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_max_iterations: 10,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Creates agents over one model client
///
/// ```no_run
/// use agent_runtime::AgentRuntime;
/// use agent_llm::providers::OpenAIProvider;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let runtime = AgentRuntime::builder()
///     .provider(Arc::new(OpenAIProvider::from_env()?))
///     .default_model("deepseek-chat")
///     .build()?;
///
/// let writer = runtime.create_simple_agent(runtime.simple_config(), "Report_Agent");
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self { provider, config }
    }

    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::default()
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Executor settings seeded with the runtime defaults
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_iterations: self.config.default_max_iterations,
            model: self.config.default_model.clone(),
            ..ExecutorConfig::default()
        }
    }

    pub fn simple_config(&self) -> SimpleConfig {
        SimpleConfig {
            model: self.config.default_model.clone(),
            ..SimpleConfig::default()
        }
    }

    /// A text-only agent
    pub fn create_simple_agent(&self, config: SimpleConfig, name: impl Into<String>) -> SimpleAgent {
        SimpleAgent::new(self.provider.clone(), config, name)
    }

    /// An agent that may call `tools` and nothing else
    ///
    /// The tools are shared, not copied: the same `Arc<dyn Tool>` can back
    /// agents of several teams at once.
    pub fn create_tool_agent(
        &self,
        config: ExecutorConfig,
        name: impl Into<String>,
        tools: impl IntoIterator<Item = Arc<dyn Tool>>,
    ) -> ToolAgent {
        let registry = Arc::new(ToolRegistry::with_tools(tools));
        let name = name.into();
        debug!(agent = %name, tools = ?registry.names(), "Creating tool agent");
        let executor = AgentExecutor::new(self.provider.clone(), registry, config);
        ToolAgent::new(executor, name)
    }
}

#[derive(Default)]
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_max_iterations(mut self, max: usize) -> Self {
        self.config.default_max_iterations = max;
        self
    }

    /// Model used when an agent does not name one; empty means the provider's default
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;
        Ok(AgentRuntime::new(provider, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockProvider, echo_tool};
    use agent_core::Agent;

    #[test]
    fn test_builder_requires_provider() {
        let err = AgentRuntime::builder().build().err().unwrap();
        assert!(err.is_setup());
        assert_eq!(RuntimeConfig::default().default_model, "deepseek-chat");
    }

    #[test]
    fn test_agents_inherit_runtime_defaults() {
        let runtime = AgentRuntime::builder()
            .provider(Arc::new(MockProvider::new()))
            .default_model("deepseek-reasoner")
            .default_max_iterations(4)
            .build()
            .unwrap();

        let config = runtime.executor_config();
        assert_eq!(config.model, "deepseek-reasoner");
        assert_eq!(config.max_iterations, 4);
        assert_eq!(runtime.simple_config().model, "deepseek-reasoner");

        let shared = echo_tool() as Arc<dyn Tool>;
        let plotting = runtime.create_tool_agent(config.clone(), "Plotting_Agent", [shared.clone()]);
        let other = runtime.create_tool_agent(config, "Plotting_Agent", [shared.clone()]);
        assert_eq!(plotting.name(), "Plotting_Agent");
        assert_eq!(plotting.executor().tools().names(), ["echo"]);
        assert_eq!(other.executor().tools().len(), 1);
        assert_eq!(Arc::strong_count(&shared), 3);
    }
}
