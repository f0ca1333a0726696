//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use docket_workflow::WorkflowError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store timed out: {0}")]
  Timeout(String),
}

impl From<WorkflowError> for ApiError {
  fn from(e: WorkflowError) -> Self {
    match e {
      WorkflowError::NotFound(id) => Self::NotFound(format!("subject {id} not found")),
      WorkflowError::Timeout(_) => Self::Timeout(e.to_string()),
      WorkflowError::Persistence(source) => Self::Store(source),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Timeout(m) => (StatusCode::GATEWAY_TIMEOUT, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
