//! Assembling the stock analysis team

use agent_core::{Error, Result};
use agent_llm::LLMProvider;
use agent_llm::providers::{OpenAIConfig, OpenAIProvider};
use agent_runtime::AgentRuntime;
use agent_team::{RoundRobinTeam, TeamFactory, TextMentionTermination};
use agent_tools::Tool;
use std::sync::Arc;
use tracing::info;

use crate::agents::{AgentRole, build_agent};
use crate::api::{BochaClient, PriceSource, YahooFinanceClient, http_client};
use crate::config::StockConfig;
use crate::tools::{AnalyzeStockTool, SaveReportTool, WebSearchTool};

/// Tools shared by every team the factory creates
struct Toolkit {
    task_search: Arc<dyn Tool>,
    search: Arc<dyn Tool>,
    analyze: Arc<dyn Tool>,
    save_report: Arc<dyn Tool>,
}

impl Toolkit {
    fn new(config: &StockConfig, prices: Arc<dyn PriceSource>) -> Result<Self> {
        let proxy = config.proxy.as_deref();
        let api = http_client(config.page_fetch_timeout, proxy)?;
        let pages = http_client(config.page_fetch_timeout, proxy)?;

        let web_search = |key: Option<String>| -> Arc<dyn Tool> {
            let client = BochaClient::new(
                api.clone(),
                key,
                config.search_requests_per_minute,
                config.search_cache_ttl,
            );
            Arc::new(WebSearchTool::new(client, pages.clone(), config.page_fetch_delay))
        };

        Ok(Self {
            task_search: web_search(config.task_search_api_key.clone()),
            search: web_search(config.search_api_key.clone()),
            analyze: Arc::new(AnalyzeStockTool::new(prices, config)),
            save_report: Arc::new(SaveReportTool::new(config)?),
        })
    }

    fn for_role(&self, role: AgentRole) -> Option<Arc<dyn Tool>> {
        match role {
            AgentRole::TaskAnalysis => Some(self.task_search.clone()),
            AgentRole::Search => Some(self.search.clone()),
            AgentRole::Plotting => Some(self.analyze.clone()),
            AgentRole::Report => None,
            AgentRole::Output => Some(self.save_report.clone()),
        }
    }
}

/// Creates a fresh five-agent team per task
///
/// Tools, and with them the search cache and rate limits, are shared by all
/// teams. Each team starts with empty memory.
pub struct StockTeamFactory {
    runtime: Arc<AgentRuntime>,
    config: StockConfig,
    toolkit: Toolkit,
}

impl StockTeamFactory {
    /// Create a factory over an existing runtime and price source
    pub fn new(
        runtime: Arc<AgentRuntime>,
        config: StockConfig,
        prices: Arc<dyn PriceSource>,
    ) -> Result<Self> {
        config.validate()?;
        let toolkit = Toolkit::new(&config, prices)?;
        Ok(Self {
            runtime,
            config,
            toolkit,
        })
    }

    /// Create a factory with the given model provider and Yahoo Finance prices
    pub fn with_provider(provider: Arc<dyn LLMProvider>, config: StockConfig) -> Result<Self> {
        let runtime = AgentRuntime::builder()
            .provider(provider)
            .default_model(config.model.clone())
            .build()?;
        Self::new(Arc::new(runtime), config, Arc::new(YahooFinanceClient::new()))
    }

    /// Create a factory entirely from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(StockConfig::from_env()?)
    }

    /// Create a factory from `config`, reading the model client settings
    /// from the environment
    pub fn from_config(config: StockConfig) -> Result<Self> {
        let llm_config = OpenAIConfig::from_env()
            .map_err(|e| Error::InitializationFailed(e.to_string()))?
            .with_default_model(config.model.clone());
        let provider = OpenAIProvider::with_config(llm_config)
            .map_err(|e| Error::InitializationFailed(e.to_string()))?;

        info!(
            model = %config.model,
            language = config.language.code(),
            output_dir = %config.output_dir.display(),
            "Stock team factory initialised"
        );
        Self::with_provider(Arc::new(provider), config)
    }

    /// The configuration teams are built from
    pub fn config(&self) -> &StockConfig {
        &self.config
    }
}

impl TeamFactory for StockTeamFactory {
    fn create_team(&self) -> Result<RoundRobinTeam> {
        // Report_Agent ends its report with the marker too; only the last
        // agent may stop the run so the report still gets saved.
        let termination =
            TextMentionTermination::default().with_sources([AgentRole::Output.name()]);

        AgentRole::ALL
            .into_iter()
            .fold(RoundRobinTeam::builder(), |builder, role| {
                builder.agent(build_agent(
                    &self.runtime,
                    &self.config,
                    role,
                    self.toolkit.for_role(role),
                ))
            })
            .max_turns(self.config.max_turns)
            .termination(termination)
            .build()
    }
}
