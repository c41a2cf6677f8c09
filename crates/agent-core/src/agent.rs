//! Core Agent trait definition

use crate::{AgentMessage, Context, Result};
use async_trait::async_trait;

/// Core trait that all agents must implement
///
/// `process` is the plain text entry point used by single-agent front ends.
/// Teams call [`Agent::respond`] instead, which sees the whole transcript and
/// may produce a message kind other than plain text.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Short description used when the agent is listed
    fn description(&self) -> &str {
        ""
    }

    /// Produce this agent's turn from the transcript so far
    ///
    /// The last entry of `transcript` is the newest message and is treated as
    /// the input for this turn. The default implementation ignores the earlier
    /// entries and forwards the newest one to [`Agent::process`].
    async fn respond(
        &self,
        transcript: &[AgentMessage],
        context: &mut Context,
    ) -> Result<AgentMessage> {
        let input = transcript
            .last()
            .map(AgentMessage::content_text)
            .unwrap_or_default();
        let output = self.process(input, context).await?;
        Ok(AgentMessage::text(self.name(), output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    #[async_trait]
    impl Agent for Upper {
        async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
            Ok(input.to_uppercase())
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    #[tokio::test]
    async fn test_default_respond_uses_newest_message() {
        let transcript = vec![
            AgentMessage::text("user", "first"),
            AgentMessage::text("other", "second"),
        ];
        let mut ctx = Context::new();

        let reply = Upper.respond(&transcript, &mut ctx).await.unwrap();
        assert_eq!(reply.source, "upper");
        assert_eq!(reply.content_text(), "SECOND");
        assert_eq!(reply.kind, crate::MessageKind::Text);
    }

    #[tokio::test]
    async fn test_default_respond_on_empty_transcript() {
        let mut ctx = Context::new();
        let reply = Upper.respond(&[], &mut ctx).await.unwrap();
        assert_eq!(reply.content_text(), "");
        assert_eq!(Upper.description(), "");
    }
}
