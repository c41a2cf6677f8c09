//! The five agents of the stock analysis team
//!
//! Agents are thin bindings of a name, a description, a system prompt and
//! at most one tool. Their behaviour comes entirely from the model and the
//! tool-calling loop of [`agent_runtime`].

use agent_core::Agent;
use agent_runtime::{AgentRuntime, ExecutorConfig, SimpleConfig};
use agent_tools::Tool;
use std::sync::Arc;

use crate::config::{Language, StockConfig};
use crate::prompts::system_prompt;

/// Tool-calling iterations allowed per agent turn
const MAX_TOOL_ITERATIONS: usize = 5;

/// Position of an agent in the team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentRole {
    /// Finds stock names matching the user's description
    TaskAnalysis,
    /// Finds the full ticker code of a stock
    Search,
    /// Analyses and charts the ticker
    Plotting,
    /// Writes the integrated report
    Report,
    /// Saves the report to disk
    Output,
}

impl AgentRole {
    /// Roles in speaking order
    pub const ALL: [AgentRole; 5] = [
        AgentRole::TaskAnalysis,
        AgentRole::Search,
        AgentRole::Plotting,
        AgentRole::Report,
        AgentRole::Output,
    ];

    /// Agent name, also the message source in the transcript
    pub fn name(self) -> &'static str {
        match self {
            AgentRole::TaskAnalysis => "Task_Analysis_Agent",
            AgentRole::Search => "Search_Agent",
            AgentRole::Plotting => "Plotting_Agent",
            AgentRole::Report => "Report_Agent",
            AgentRole::Output => "OutputAgent",
        }
    }

    /// Role with the given agent name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }

    /// Short description of the agent's job
    pub fn description(self, language: Language) -> &'static str {
        match (self, language) {
            (AgentRole::TaskAnalysis, Language::English) => {
                "Searches for stock names matching the features the user describes"
            }
            (AgentRole::TaskAnalysis, Language::Chinese) => "搜索符合用户所描述的特征的股票名称",
            (AgentRole::Search, Language::English) => "Finds the full ticker code of a stock",
            (AgentRole::Search, Language::Chinese) => "搜索股票在指定市场中的完整检索代码",
            (AgentRole::Plotting, Language::English) => {
                "Analyses stock price data and draws the chart"
            }
            (AgentRole::Plotting, Language::Chinese) => "专业的股票数据分析和图表制作智能体",
            (AgentRole::Report, Language::English) => {
                "Integrates all upstream outputs into the final report"
            }
            (AgentRole::Report, Language::Chinese) => "整合上游智能体的输出，生成最终报告",
            (AgentRole::Output, Language::English) => "Saves the final report to a file",
            (AgentRole::Output, Language::Chinese) => "将最终报告保存为文件",
        }
    }
}

/// Build the agent for `role`
///
/// Tool agents stop after their first tool round, so their turn ends with
/// a tool call summary carrying the tool output. A role given no tool gets
/// a text-only agent.
pub fn build_agent(
    runtime: &AgentRuntime,
    config: &StockConfig,
    role: AgentRole,
    tool: Option<Arc<dyn Tool>>,
) -> Arc<dyn Agent> {
    let prompt = system_prompt(role, config.language);
    let description = role.description(config.language);

    match tool {
        Some(tool) => {
            let executor_config = ExecutorConfig {
                max_iterations: MAX_TOOL_ITERATIONS,
                model: config.model.clone(),
                system_prompt: Some(prompt.to_string()),
                max_tokens: config.max_tokens,
                temperature: Some(config.temperature),
                reflect_on_tool_use: false,
            };
            Arc::new(
                runtime
                    .create_tool_agent(executor_config, role.name(), [tool])
                    .with_description(description),
            )
        }
        None => {
            let simple_config = SimpleConfig {
                model: config.model.clone(),
                system_prompt: prompt.to_string(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            };
            Arc::new(
                runtime
                    .create_simple_agent(simple_config, role.name())
                    .with_description(description),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_round_trip() {
        let names: Vec<_> = AgentRole::ALL.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            [
                "Task_Analysis_Agent",
                "Search_Agent",
                "Plotting_Agent",
                "Report_Agent",
                "OutputAgent"
            ]
        );
        assert_eq!(AgentRole::from_name("OutputAgent"), Some(AgentRole::Output));
        assert_eq!(AgentRole::from_name("Financial_Agent"), None);
    }

    #[test]
    fn test_descriptions_follow_language() {
        assert_eq!(
            AgentRole::TaskAnalysis.description(Language::Chinese),
            "搜索符合用户所描述的特征的股票名称"
        );
        assert!(AgentRole::Plotting.description(Language::English).contains("chart"));
    }
}
