//! Multi-agent stock analysis team
//!
//! Five agents take turns on a shared transcript:
//!
//! - `Task_Analysis_Agent` searches the web for stocks matching the request
//! - `Search_Agent` finds the full ticker code
//! - `Plotting_Agent` analyses a year of prices and draws a chart
//! - `Report_Agent` writes the integrated report
//! - `OutputAgent` saves it as HTML or Markdown
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_stock::StockTeamFactory;
//! use agent_team::TeamFactory;
//!
//! # async fn example() -> agent_core::Result<()> {
//! let factory = StockTeamFactory::from_env()?;
//! let team = factory.create_team()?;
//! let result = team.run("贵州茅台最近一年的走势如何?").await?;
//! println!("{}", result.stop_reason);
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod prompts;
pub mod team;
pub mod tools;

// Re-export main types for convenience
pub use agents::AgentRole;
pub use analysis::{StockAnalysis, Trend};
pub use config::{Language, StockConfig};
pub use error::{Result, StockError};
pub use team::StockTeamFactory;
