//! Tool management and execution framework
//!
//! Tools are the functions an LLM-backed agent may call: web search, stock
//! analysis, report saving. This crate defines the [`Tool`] trait and the
//! [`ToolRegistry`] an executor looks tools up in.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, parse_params};
