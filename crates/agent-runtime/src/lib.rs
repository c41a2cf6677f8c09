//! Agent runtime: the tool-calling executor and the concrete agents built on it
//!
//! This crate provides the [`AgentExecutor`] LLM loop, [`AgentRuntime`] for
//! sharing a provider between agents, and the [`SimpleAgent`] and
//! [`ToolAgent`] implementations of [`agent_core::Agent`].

pub mod agents;
pub mod events;
pub mod executor;
pub mod runtime;

#[cfg(test)]
mod test_support;

// Re-export key types
pub use agents::{SimpleAgent, SimpleConfig, ToolAgent, conversation_from_transcript};
pub use events::MessageForwarder;
pub use executor::{
    AgentExecutor, AgentExecutorBuilder, ExecutorConfig, ExecutorEventHandler, ExecutorOutput,
    NoOpEventHandler,
};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
