pub mod api;
pub mod types;

pub use api::ExtDirectClient;
pub use types::{
    CandidateEntry, FilterProperty, GroupConfig, GroupSettingsPayload, UpdateSuccess,
    ValidationErrors,
};

use crate::shared::ids::RepositoryId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("rejected: {0}")]
    Rejected(ValidationErrors),
}

/// Candidate registry unreachable or erroring. Always retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load candidate repositories: {message}")]
pub struct FetchFault {
    pub message: String,
}

impl From<RemoteError> for FetchFault {
    fn from(err: RemoteError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitFault {
    #[error("update rejected: {0}")]
    Validation(ValidationErrors),
    #[error("update failed: {0}")]
    Transport(String),
}

impl From<RemoteError> for SubmitFault {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Rejected(errors) => Self::Validation(errors),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Remote query for referenceable repositories.
pub trait CandidateRegistry: Send + Sync {
    fn query(&self, filter: &[FilterProperty]) -> Result<Vec<CandidateEntry>, FetchFault>;
}

/// Remote "update group" operation.
pub trait GroupUpdater: Send + Sync {
    fn update_group(&self, payload: &GroupSettingsPayload) -> Result<UpdateSuccess, SubmitFault>;
}

pub trait GroupReader: Send + Sync {
    fn read_group(&self, id: &RepositoryId) -> Result<GroupConfig, RemoteError>;
}
