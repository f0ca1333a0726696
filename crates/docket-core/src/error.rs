//! Error types for `docket-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown state label: {0:?}")]
  UnknownState(String),

  #[error("subject attributes must be a JSON object, got {0}")]
  AttributesNotObject(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
