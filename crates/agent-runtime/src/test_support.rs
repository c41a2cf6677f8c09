//! Scripted provider and tools shared by the unit tests

use agent_llm::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMProvider, Message, MessageContent,
    Role, StopReason, TokenUsage,
};
use agent_tools::Tool;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

mockall::mock! {
    pub Provider {}

    #[async_trait]
    impl LLMProvider for Provider {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse>;
        fn name(&self) -> &str;
    }
}

fn usage() -> TokenUsage {
    TokenUsage {
        input_tokens: 10,
        output_tokens: 5,
    }
}

pub fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        stop_reason: StopReason::EndTurn,
        usage: usage(),
    }
}

pub fn tool_call_response(id: &str, name: &str, input: Value) -> CompletionResponse {
    CompletionResponse {
        message: Message {
            role: Role::Assistant,
            content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }])),
            name: None,
        },
        stop_reason: StopReason::ToolUse,
        usage: usage(),
    }
}

/// Returns its `text` parameter verbatim
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    async fn execute(&self, params: Value) -> agent_core::Result<Value> {
        Ok(params.get("text").cloned().unwrap_or(Value::Null))
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the text parameter"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"text": {"type": "string"}}})
    }
}

pub fn echo_tool() -> Arc<EchoTool> {
    Arc::new(EchoTool)
}
