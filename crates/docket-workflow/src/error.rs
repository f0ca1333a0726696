//! Error type for `docket-workflow`.

use std::time::Duration;

use docket_core::subject::SubjectId;
use thiserror::Error;

/// A failure that aborts a workflow call. A rejected event is not an error;
/// see [`docket_core::machine::Outcome::Rejected`].
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("subject not found: {0}")]
  NotFound(SubjectId),

  /// The repository failed to read or write; any transition in flight did
  /// not happen.
  #[error("persistence failure: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("persistence timed out after {0:?}")]
  Timeout(Duration),
}

impl WorkflowError {
  pub(crate) fn persistence<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(error))
  }
}

pub type Result<T, E = WorkflowError> = std::result::Result<T, E>;
