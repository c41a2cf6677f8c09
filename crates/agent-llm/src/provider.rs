//! The chat model seam

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A chat completion service
///
/// Agents share one provider through `Arc<dyn LLMProvider>`; tests swap in a
/// `mockall` double.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send one request and wait for the whole reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Model used for requests that leave `model` empty
    fn default_model(&self) -> Option<&str> {
        None
    }
}
