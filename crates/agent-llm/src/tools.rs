//! Tool descriptions sent to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A function the model may call: its name, what it is for, and a JSON
/// Schema of its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// JSON Schema fragments for tool arguments
///
/// ```
/// use agent_llm::tools::schema;
/// use serde_json::json;
///
/// let args = schema::object(
///     json!({
///         "ticker": schema::string("Ticker symbol, e.g. 600519.SS"),
///         "max_chars": schema::integer_with_default("Characters kept per page", 500),
///         "output_format": schema::string_enum("Report format", &["html", "markdown"]),
///     }),
///     vec!["ticker"],
/// );
/// assert_eq!(args["required"][0], "ticker");
/// assert_eq!(args["properties"]["output_format"]["enum"][1], "markdown");
/// ```
pub mod schema {
    use serde_json::{Value, json};

    /// An object with the given properties, of which `required` must be set
    pub fn object(properties: Value, required: Vec<&str>) -> Value {
        json!({ "type": "object", "properties": properties, "required": required })
    }

    pub fn string(description: &str) -> Value {
        typed("string", description)
    }

    pub fn integer_with_default(description: &str, default: i64) -> Value {
        let mut property = typed("integer", description);
        property["default"] = json!(default);
        property
    }

    /// A string limited to `values`
    pub fn string_enum(description: &str, values: &[&str]) -> Value {
        let mut property = typed("string", description);
        property["enum"] = json!(values);
        property
    }

    fn typed(kind: &str, description: &str) -> Value {
        json!({ "type": kind, "description": description })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_keeps_schema() {
        let args = schema::object(json!({ "query": schema::string("Search query") }), vec!["query"]);
        let tool = ToolDefinition::new("web_search", "Search the web", args.clone());
        assert_eq!(tool.name, "web_search");
        assert_eq!(tool.input_schema, args);
        assert_eq!(args["type"], "object");
        assert_eq!(args["properties"]["query"]["type"], "string");
    }

    #[test]
    fn test_property_fragments() {
        let count = schema::integer_with_default("results", 2);
        assert_eq!(count, json!({ "type": "integer", "description": "results", "default": 2 }));

        let format = schema::string_enum("format", &["html", "markdown"]);
        assert_eq!(format["type"], "string");
        assert_eq!(format["enum"], json!(["html", "markdown"]));
    }
}
