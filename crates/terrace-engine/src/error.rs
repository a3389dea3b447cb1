use terrace_providers::ProviderError;
use thiserror::Error;

use crate::pipeline::Stage;

/// A single raw record that could not be turned into a comment.
///
/// These never abort a batch; the loader logs and skips the record.
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("{record} is missing required field '{field}'")]
    MissingField { record: String, field: &'static str },

    #[error("malformed {context}: {source}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid batch payload: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("{stage} stage failed: {source}")]
    ProviderFailure {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    #[error("{stage} stage returned {got} results for {expected} comments")]
    StageShape {
        stage: Stage,
        expected: usize,
        got: usize,
    },

    #[error("{stage} annotations were already attached to this batch")]
    ColumnConflict { stage: Stage },

    #[error("batch finished without {stage} annotations")]
    IncompleteBatch { stage: Stage },

    #[error("no analyzed batch is available yet")]
    NotReady,
}

impl EngineError {
    /// The pipeline stage that failed, for stage-scoped errors.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EngineError::ProviderFailure { stage, .. }
            | EngineError::StageShape { stage, .. }
            | EngineError::ColumnConflict { stage }
            | EngineError::IncompleteBatch { stage } => Some(*stage),
            EngineError::InvalidInput(_) | EngineError::NotReady => None,
        }
    }
}
