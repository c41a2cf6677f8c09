//! Errors shared by agents and teams

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// An agent or team could not be assembled, e.g. a missing model client
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// A turn failed: model call, tool arguments, or the conversation itself
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// A team run stopped before producing a result
    #[error("Team run aborted: {0}")]
    TeamAborted(String),
}

impl Error {
    /// Whether the failure happened before any turn ran
    pub fn is_setup(&self) -> bool {
        matches!(self, Error::InitializationFailed(_))
    }
}
