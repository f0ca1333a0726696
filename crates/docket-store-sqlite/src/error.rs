//! Error type for `docket-store-sqlite`.

use docket_core::subject::SubjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] docket_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to save a subject that was never inserted (or was deleted).
  #[error("subject not found: {0}")]
  SubjectNotFound(SubjectId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
