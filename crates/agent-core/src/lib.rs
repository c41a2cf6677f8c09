//! Core abstractions for the stock analysis agent team
//!
//! This crate defines the fundamental traits and types shared by every other
//! crate in the workspace: the [`Agent`] trait, the [`AgentMessage`] records
//! agents exchange, the [`SharedMemory`] transcript a team writes into, and the
//! per-run [`Context`].

pub mod agent;
pub mod context;
pub mod error;
pub mod memory;
pub mod message;

pub use agent::Agent;
pub use context::{Context, EventSink};
pub use error::{Error, Result};
pub use memory::SharedMemory;
pub use message::{AgentMessage, MessageKind};
