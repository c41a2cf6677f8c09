//! The set of tools one agent may call

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::warn;

use crate::Tool;

/// Tools keyed by name
///
/// Built once per agent; tools themselves are shared, so several agents (and
/// several teams) can hold the same `Arc<dyn Tool>`. Iteration is ordered by
/// name, which keeps the tool list sent to the model stable between turns.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `tools`; a later tool wins over an earlier one of the same name
    pub fn with_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        tools.into_iter().collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Tools ordered by name
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl FromIterator<Arc<dyn Tool>> for ToolRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Tool>>>(iter: I) -> Self {
        let mut tools = BTreeMap::new();
        for tool in iter {
            let name = tool.name().to_string();
            if tools.insert(name.clone(), tool).is_some() {
                warn!(tool = %name, "Duplicate tool name, keeping the last one");
            }
        }
        Self { tools }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        async fn execute(&self, params: Value) -> agent_core::Result<Value> {
            Ok(json!({ "tool": self.0, "echo": params }))
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn tool(name: &'static str) -> Arc<dyn Tool> {
        Arc::new(Named(name))
    }

    #[test]
    fn test_lookup_and_order() {
        let registry =
            ToolRegistry::with_tools([tool("web_search"), tool("analyze_stock"), tool("save_report")]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), ["analyze_stock", "save_report", "web_search"]);
        assert!(registry.get("web_search").is_some());
        assert!(registry.get("get_news").is_none());
        assert!(ToolRegistry::new().is_empty());
    }

    #[test]
    fn test_duplicate_name_keeps_one() {
        let registry: ToolRegistry = [tool("web_search"), tool("web_search")].into_iter().collect();
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_shared_tool_executes_from_any_registry() {
        let shared = tool("echo");
        let first = ToolRegistry::with_tools([shared.clone()]);
        let second = ToolRegistry::with_tools([shared]);

        let out = tokio_test::assert_ok!(first.get("echo").unwrap().execute(json!({"q": 1})).await);
        assert_eq!(out["echo"]["q"], 1);
        assert_eq!(second.iter().count(), 1);
    }
}
