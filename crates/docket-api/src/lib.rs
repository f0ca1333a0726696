//! JSON REST API for Docket.
//!
//! Exposes an axum [`Router`] backed by a [`Workflow`] over any
//! [`SubjectRepository`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", docket_api::api_router(workflow.clone()))
//! ```

pub mod error;
pub mod state;
pub mod subjects;

use std::sync::Arc;

use axum::{Router, routing::get};
use docket_core::store::SubjectRepository;
use docket_workflow::Workflow;

pub use error::ApiError;

/// Build a fully-materialised API router for `workflow`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<R>(workflow: Arc<Workflow<R>>) -> Router<()>
where
  R: SubjectRepository + 'static,
{
  Router::new()
    .route("/subjects", get(subjects::list::<R>).post(subjects::create::<R>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<R>)
        .put(subjects::edit::<R>)
        .delete(subjects::delete::<R>),
    )
    .route(
      "/subjects/{id}/state",
      get(state::current::<R>).patch(state::change::<R>),
    )
    .with_state(workflow)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use docket_notify::{
    LoggingObserver, MemoryChannel, NotificationPublisher, PublisherConfig,
  };
  use docket_store_sqlite::SqliteStore;
  use docket_workflow::{Workflow, WorkflowConfig};
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::api_router;

  async fn make_app() -> axum::Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let (publisher, _handle) = NotificationPublisher::spawn(
      MemoryChannel::new(),
      PublisherConfig::default(),
      Arc::new(LoggingObserver),
    );
    let workflow =
      Workflow::new(Arc::new(store), publisher, WorkflowConfig::default());
    api_router(Arc::new(workflow))
  }

  async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = app
      .clone()
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create(app: &axum::Router) -> i64 {
    let (status, body) = send(
      app,
      "POST",
      "/subjects",
      Some(json!({ "first_name": "Ada", "last_name": "Lovelace" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"], "ADDED");
    body["id"].as_i64().unwrap()
  }

  // ── Subjects ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_get() {
    let app = make_app().await;
    let id = create(&app).await;

    let (status, body) = send(&app, "GET", &format!("/subjects/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attributes"]["first_name"], "Ada");

    let (status, body) = send(&app, "GET", "/subjects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn create_with_non_object_body_is_400() {
    let app = make_app().await;
    let (status, body) = send(&app, "POST", "/subjects", Some(json!([1]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("JSON object"));
  }

  #[tokio::test]
  async fn get_unknown_is_404() {
    let app = make_app().await;
    let (status, _) = send(&app, "GET", "/subjects/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn edit_moves_subject_to_updated() {
    let app = make_app().await;
    let id = create(&app).await;

    let (status, body) = send(
      &app,
      "PUT",
      &format!("/subjects/{id}"),
      Some(json!({ "first_name": "Ada", "position": "CTO" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "UPDATED");
    assert_eq!(body["attributes"]["position"], "CTO");
  }

  #[tokio::test]
  async fn delete_then_404() {
    let app = make_app().await;
    let id = create(&app).await;
    let uri = format!("/subjects/{id}");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── State ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn patch_state_applies_event() {
    let app = make_app().await;
    let id = create(&app).await;
    let uri = format!("/subjects/{id}/state");

    let (status, body) =
      send(&app, "PATCH", &uri, Some(json!({ "event": "CHECK" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "IN_CHECK");
    assert_eq!(body["accepted"], true);
    assert_eq!(body["id"], id);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "IN_CHECK");
    assert_eq!(body["events"], json!(["APPROVE", "REJECT"]));
  }

  #[tokio::test]
  async fn patch_state_with_inapplicable_event_is_not_accepted() {
    let app = make_app().await;
    let id = create(&app).await;

    let (status, body) = send(
      &app,
      "PATCH",
      &format!("/subjects/{id}/state"),
      Some(json!({ "event": "ACTIVATE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ADDED");
    assert_eq!(body["accepted"], false);
  }

  #[tokio::test]
  async fn patch_state_on_unknown_subject_is_404() {
    let app = make_app().await;
    let (status, _) = send(
      &app,
      "PATCH",
      "/subjects/5/state",
      Some(json!({ "event": "CHECK" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn patch_state_with_unknown_event_is_400_with_json_error() {
    let app = make_app().await;
    let id = create(&app).await;
    let (status, body) = send(
      &app,
      "PATCH",
      &format!("/subjects/{id}/state"),
      Some(json!({ "event": "PROMOTE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("PROMOTE"), "{body}");
  }

  #[tokio::test]
  async fn malformed_json_body_is_400_with_json_error() {
    let app = make_app().await;
    let resp = app
      .clone()
      .oneshot(
        Request::builder()
          .method("POST")
          .uri("/subjects")
          .header(header::CONTENT_TYPE, "application/json")
          .body(Body::from("{not json"))
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
  }

  // ── Listing ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_filters_by_state_and_pages() {
    let app = make_app().await;
    let mut ids = Vec::new();
    for _ in 0..4 {
      ids.push(create(&app).await);
    }
    for id in [ids[1], ids[3]] {
      let (status, _) = send(
        &app,
        "PATCH",
        &format!("/subjects/{id}/state"),
        Some(json!({ "event": "CHECK" })),
      )
      .await;
      assert_eq!(status, StatusCode::OK);
    }

    let listed_ids = |body: Value| -> Vec<i64> {
      body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
    };

    let (status, body) = send(&app, "GET", "/subjects?state=IN_CHECK", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed_ids(body), vec![ids[1], ids[3]]);

    let (_, body) = send(&app, "GET", "/subjects?limit=2&offset=1", None).await;
    assert_eq!(listed_ids(body), vec![ids[1], ids[2]]);

    let (_, body) =
      send(&app, "GET", "/subjects?state=ADDED&limit=1&offset=1", None).await;
    assert_eq!(listed_ids(body), vec![ids[2]]);
  }

  #[tokio::test]
  async fn list_with_unknown_state_is_400() {
    let app = make_app().await;
    let (status, body) = send(&app, "GET", "/subjects?state=PENDING", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }
}
