use thiserror::Error;

use crate::codec::FormatError;

/// Failures that stop a pipeline run.
///
/// Bad input records never end up here, they are skipped and counted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration validation error: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse {path} line {line}: {source}")]
    Format {
        path: String,
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error("Failed to serialize JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
