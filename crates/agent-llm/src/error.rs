//! Model client errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

/// Failure of a model call
///
/// HTTP failures are classified by status code so callers can tell a bad key
/// or an empty balance apart from an overloaded service.
#[derive(Error, Debug)]
pub enum LLMError {
    /// Transport failure or an unclassified HTTP status
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// HTTP 401 or 403
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// HTTP 429
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// HTTP 400 or 422
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP 404, carrying the requested model
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// HTTP 402
    #[error("Insufficient account balance: {0}")]
    InsufficientBalance(String),

    /// HTTP 5xx
    #[error("Service unavailable (HTTP {status}): {body}")]
    ServiceUnavailable { status: u16, body: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The body parsed but is not a usable completion
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Missing key or an unreadable setting
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Classify a non-success HTTP answer
    pub fn from_status(status: u16, body: String, model: String) -> Self {
        match status {
            401 | 403 => LLMError::AuthenticationFailed,
            402 => LLMError::InsufficientBalance(body),
            429 => LLMError::RateLimitExceeded(body),
            400 | 422 => LLMError::InvalidRequest(body),
            404 => LLMError::ModelNotFound(model),
            500..=599 => LLMError::ServiceUnavailable { status, body },
            _ => LLMError::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}
