//! Handlers for `/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subjects` | By id; optional `?state=IN_CHECK&limit=20&offset=40` |
//! | `POST`   | `/subjects` | Body: attribute object; returns 201 + subject in `ADDED` |
//! | `GET`    | `/subjects/:id` | 404 if not found |
//! | `PUT`    | `/subjects/:id` | Body: attribute object; subject moves to `UPDATED` |
//! | `DELETE` | `/subjects/:id` | 204, or 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use docket_core::{
  state::State as LifecycleState,
  store::{SubjectQuery, SubjectRepository},
  subject::{Attributes, Subject, SubjectId, attributes_from_value},
};
use docket_workflow::Workflow;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

fn attributes(body: Value) -> Result<Attributes, ApiError> {
  attributes_from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub state:  Option<LifecycleState>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /subjects[?state=<STATE>][&limit=...][&offset=...]`
pub async fn list<R: SubjectRepository + 'static>(
  State(workflow): State<Arc<Workflow<R>>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let Query(params) = params?;
  let query = SubjectQuery {
    state:  params.state,
    limit:  params.limit,
    offset: params.offset,
  };
  Ok(Json(workflow.list(query).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /subjects`, body: `{"first_name":"Ada", ...}`
pub async fn create<R: SubjectRepository + 'static>(
  State(workflow): State<Arc<Workflow<R>>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  let subject = workflow.register(attributes(body)?).await?;
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subjects/:id`
pub async fn get_one<R: SubjectRepository + 'static>(
  State(workflow): State<Arc<Workflow<R>>>,
  Path(id): Path<SubjectId>,
) -> Result<Json<Subject>, ApiError> {
  Ok(Json(workflow.get(id).await?))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

/// `PUT /subjects/:id`: replaces all attributes.
pub async fn edit<R: SubjectRepository + 'static>(
  State(workflow): State<Arc<Workflow<R>>>,
  Path(id): Path<SubjectId>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Subject>, ApiError> {
  let Json(body) = body?;
  Ok(Json(workflow.amend(id, attributes(body)?).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subjects/:id`
pub async fn delete<R: SubjectRepository + 'static>(
  State(workflow): State<Arc<Workflow<R>>>,
  Path(id): Path<SubjectId>,
) -> Result<StatusCode, ApiError> {
  workflow.remove(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
