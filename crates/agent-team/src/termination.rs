//! Conditions that end a team run early

use agent_core::AgentMessage;

/// Decides after each turn whether the run should stop
pub trait TerminationCondition: Send + Sync {
    /// Returns the stop reason when `message` ends the run
    fn check(&self, message: &AgentMessage) -> Option<String>;
}

/// Stops when a reply contains a given text
#[derive(Debug, Clone)]
pub struct TextMentionTermination {
    text: String,
    sources: Vec<String>,
}

impl TextMentionTermination {
    /// Stop when a reply mentions `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }

    /// Only consider replies from these agents
    ///
    /// With no sources every reply is checked.
    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for TextMentionTermination {
    fn default() -> Self {
        Self::new("TERMINATE")
    }
}

impl TerminationCondition for TextMentionTermination {
    fn check(&self, message: &AgentMessage) -> Option<String> {
        if !self.sources.is_empty() && !self.sources.iter().any(|s| *s == message.source) {
            return None;
        }
        message
            .mentions(&self.text)
            .then(|| format!("Text '{}' mentioned", self.text))
    }
}
