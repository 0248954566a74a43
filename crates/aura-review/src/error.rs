//! Review session error types.

use thiserror::Error;

use aura_analysis_client::AnalysisError;

pub type ReviewResult<T> = Result<T, ReviewError>;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// Caught before any network interaction; the reviewer can fix and retry
    /// immediately.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The analysis service rejected or failed a request; local session state
    /// is unchanged and the action can be retried.
    #[error("Analysis service error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReviewError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
