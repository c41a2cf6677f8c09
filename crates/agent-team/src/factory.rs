//! Creating a fresh team per task

use crate::RoundRobinTeam;
use agent_core::Result;

/// Builds a new team for each submitted task
///
/// Closures returning `Result<RoundRobinTeam>` implement this trait.
pub trait TeamFactory: Send + Sync {
    /// Create a team with empty memory
    fn create_team(&self) -> Result<RoundRobinTeam>;
}

impl<F> TeamFactory for F
where
    F: Fn() -> Result<RoundRobinTeam> + Send + Sync,
{
    fn create_team(&self) -> Result<RoundRobinTeam> {
        self()
    }
}
