//! Handlers for `/subjects/:id/state`.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/subjects/:id/state` | Current state and the events it accepts |
//! | `PATCH` | `/subjects/:id/state` | Body: `{"event":"CHECK"}`; returns the re-read subject |
//!
//! An unknown event name is a 400. An event that is not applicable in the
//! subject's state is not an error: the response is 200 with the unchanged
//! subject and `"accepted": false`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use docket_core::{
  state::{Event, State as LifecycleState},
  store::SubjectRepository,
  subject::{Subject, SubjectId},
  transition,
};
use docket_workflow::Workflow;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Current state ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CurrentState {
  pub id:     SubjectId,
  pub state:  LifecycleState,
  /// Events accepted in `state`; empty for terminal states.
  pub events: Vec<Event>,
}

/// `GET /subjects/:id/state`
pub async fn current<R: SubjectRepository + 'static>(
  State(workflow): State<Arc<Workflow<R>>>,
  Path(id): Path<SubjectId>,
) -> Result<Json<CurrentState>, ApiError> {
  let state = workflow.current_state(id).await?;
  Ok(Json(CurrentState {
    id,
    state,
    events: transition::table().events_from(state),
  }))
}

// ─── Change state ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StateEvent {
  pub event: Event,
}

#[derive(Debug, Serialize)]
pub struct StateChange {
  #[serde(flatten)]
  pub subject:  Subject,
  pub accepted: bool,
}

/// `PATCH /subjects/:id/state`, body: `{"event":"CHECK"}`
pub async fn change<R: SubjectRepository + 'static>(
  State(workflow): State<Arc<Workflow<R>>>,
  Path(id): Path<SubjectId>,
  body: Result<Json<StateEvent>, JsonRejection>,
) -> Result<Json<StateChange>, ApiError> {
  let Json(body) = body?;
  let applied = workflow.apply(id, body.event).await?;
  Ok(Json(StateChange {
    accepted: applied.accepted(),
    subject:  applied.subject,
  }))
}
