use thiserror::Error;

use crate::dataset::SourceId;

/// A dataset fetch that did not produce usable data.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_id} returned status {status}")]
    Status { source_id: SourceId, status: u16 },
    #[error("{source_id} transport error: {reason}")]
    Transport { source_id: SourceId, reason: String },
    #[error("{source_id} payload is malformed: {reason}")]
    Malformed { source_id: SourceId, reason: String },
}

impl SourceError {
    pub fn source_id(&self) -> SourceId {
        match self {
            SourceError::Status { source_id, .. }
            | SourceError::Transport { source_id, .. }
            | SourceError::Malformed { source_id, .. } => *source_id,
        }
    }

    /// Transport failures and server-side statuses are worth one more attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Transport { .. } => true,
            SourceError::Status { status, .. } => *status >= 500,
            SourceError::Malformed { .. } => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("run aborted: {0}")]
    RunAborted(#[from] SourceError),
    #[error("configuration error: {0}")]
    Config(String),
}
