//! Chat model access for the agent workspace
//!
//! Agents talk to models through [`LLMProvider`]. Requests carry the
//! conversation as [`Message`]s, optional [`ToolDefinition`]s the model may
//! call, and sampling settings. The `openai` feature (on by default) adds a
//! client for OpenAI-compatible endpoints such as DeepSeek.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(feature = "openai")]
pub mod providers;
