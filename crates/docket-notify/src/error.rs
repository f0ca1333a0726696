//! Error type for `docket-notify`.

use docket_core::subject::SubjectId;
use thiserror::Error;

/// Why a notification did not reach its destination.
#[derive(Debug, Error)]
pub enum PublishError {
  /// The outbound buffer stayed full for the whole admission window.
  #[error("outbound buffer full; notification for subject {0} dropped")]
  BufferFull(SubjectId),

  /// The publisher's worker has stopped.
  #[error("publisher is shut down")]
  Closed,

  #[error("failed to serialise notification: {0}")]
  Serialization(#[from] docket_core::Error),

  #[error("delivery to {destination:?} failed: {source}")]
  Delivery {
    destination: String,
    #[source]
    source:      Box<dyn std::error::Error + Send + Sync>,
  },
}
