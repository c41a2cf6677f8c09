//! Shared utilities for the agent workspace
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup, `.env` loading and typed access to environment variables.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_first, env_parse, env_string, load_env, proxy_url};
pub use logging::{init_tracing, preview};
