//! Tool trait definition

use agent_core::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool provides a unique name, a description the model reads when
/// deciding whether to call it, and a JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// `params` is the JSON object produced by the model and should match
    /// [`Tool::input_schema`]. Errors are reported back to the model as tool
    /// errors, so they should be phrased for it to read.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    ///
    /// # Example
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "ticker": { "type": "string" }
    ///     },
    ///     "required": ["ticker"]
    /// });
    /// ```
    fn input_schema(&self) -> Value;
}

/// Deserialize tool parameters, naming the tool in the error
pub fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| {
        agent_core::Error::ProcessingFailed(format!("Invalid parameters for {tool}: {e}"))
    })
}
