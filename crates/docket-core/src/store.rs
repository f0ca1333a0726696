//! The `SubjectRepository` trait.
//!
//! The trait is implemented by storage backends (e.g. `docket-store-sqlite`).
//! The workflow and the HTTP layer depend on this abstraction, not on any
//! concrete backend. The workflow itself only ever calls [`find`] and
//! [`save`]; the remaining methods serve the CRUD surface.
//!
//! [`find`]: SubjectRepository::find
//! [`save`]: SubjectRepository::save

use std::future::Future;

use crate::{
  state::State,
  subject::{NewSubject, Subject, SubjectId},
};

/// Page size used when [`SubjectQuery::limit`] is not set.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Parameters for [`SubjectRepository::list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectQuery {
  /// Restrict to subjects currently in this state.
  pub state:  Option<State>,
  /// At most this many subjects; [`DEFAULT_PAGE_SIZE`] if unset.
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a subject persistence backend.
///
/// The backend owns consistency per subject row. Callers guarantee they do
/// not issue two conflicting writes for the same subject concurrently.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubjectRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a subject by id. Returns `None` if not found.
  fn find(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Persist every field of an existing subject and return it as stored.
  /// `updated_at` is set by the store. Fails if the id is unknown.
  fn save(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Create a subject; the store assigns its id and timestamps.
  fn insert(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// One page of subjects matching `query`, ordered by id.
  fn list(
    &self,
    query: SubjectQuery,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Remove a subject. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
