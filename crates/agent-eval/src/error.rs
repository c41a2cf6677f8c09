//! Error types for evaluation runs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// Reading a dataset file failed
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The ground truth file is not a JSON array of records
    #[error("Invalid ground truth JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The model output CSV could not be parsed
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column or field is absent
    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// A value is not a valid Python literal
    #[error("Invalid literal at offset {offset}: {reason}")]
    Literal { offset: usize, reason: String },

    /// The judge model call failed
    #[error("Judge request failed: {0}")]
    Judge(#[from] agent_llm::LLMError),

    /// The judge answered in an unexpected shape
    #[error("Unexpected judge verdict: {0}")]
    Verdict(String),

    /// Writing the results failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
