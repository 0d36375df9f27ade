//! Error types for module loading and analysis.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not read input module {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("malformed input module: {0}")]
    MalformedModule(String),

    #[error("could not write report output to {path}: {source}")]
    ReportWrite { path: String, #[source] source: std::io::Error },
}

pub type Result<T> = std::result::Result<T, EngineError>;
