//! Multi-agent orchestration
//!
//! A [`RoundRobinTeam`] gives each of its agents a turn in fixed order,
//! records every turn in a shared transcript and stops when a
//! [`TerminationCondition`] fires or the turn budget runs out.

pub mod events;
pub mod factory;
pub mod team;
pub mod termination;

// Re-export for convenience
pub use events::{TaskResult, TeamEvent};
pub use factory::TeamFactory;
pub use team::{DEFAULT_MAX_TURNS, RoundRobinTeam, RoundRobinTeamBuilder};
pub use termination::{TerminationCondition, TextMentionTermination};
