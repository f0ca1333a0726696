//! The pre-transition action: persist, then announce.

use std::{future::Future, sync::Arc, time::Duration};

use docket_core::{
  machine::PendingTransition,
  notification::NotificationRecord,
  store::SubjectRepository,
  subject::{Subject, SubjectId},
};
use docket_notify::NotificationPublisher;

use crate::{Result, WorkflowError};

/// Writes the target state of a pending transition through the repository
/// and, once that has succeeded, hands a snapshot to the publisher.
///
/// A failed write aborts the transition. A failed publish does not: the
/// state is already committed and the publisher reports the failure on its
/// own.
///
/// Writes run on their own task. A write that overruns the persistence
/// timeout is still awaited before the caller sees [`WorkflowError::Timeout`],
/// so it can never land after the subject's lock has been released. If it
/// did land, it is announced like any other.
pub struct TransitionInterceptor<R> {
  repo:      Arc<R>,
  publisher: NotificationPublisher,
  topic:     String,
  timeout:   Duration,
}

impl<R: SubjectRepository + 'static> TransitionInterceptor<R> {
  pub fn new(
    repo: Arc<R>,
    publisher: NotificationPublisher,
    topic: impl Into<String>,
    timeout: Duration,
  ) -> Self {
    Self { repo, publisher, topic: topic.into(), timeout }
  }

  pub async fn on_transition(&self, pending: PendingTransition) -> Result<()> {
    tracing::info!(
      subject_id = pending.subject_id,
      event = %pending.event,
      "state will change for subject {}, to state: -> {}",
      pending.subject_id,
      pending.to,
    );

    // Re-read rather than trust the machine's copy.
    let mut subject = self.load(pending.subject_id).await?;
    subject.state = pending.to;
    let saved = self.store(subject).await?;

    self.announce(&saved).await;
    Ok(())
  }

  /// Load a subject, bounded by the persistence timeout.
  pub async fn load(&self, subject_id: SubjectId) -> Result<Subject> {
    self
      .bounded(self.repo.find(subject_id))
      .await?
      .ok_or(WorkflowError::NotFound(subject_id))
  }

  /// Save a subject. See the type docs for what happens on timeout.
  pub async fn store(&self, subject: Subject) -> Result<Subject> {
    let written = self
      .write(move |repo| async move { repo.save(subject).await })
      .await?;
    self.settle(written).await
  }

  /// Hand back a subject written in time. One written late is announced
  /// here, since its caller only ever sees the timeout.
  pub(crate) async fn settle(&self, written: Written<Subject>) -> Result<Subject> {
    match written {
      Written::InTime(subject) => Ok(subject),
      Written::Late(subject) => {
        tracing::warn!(
          subject_id = subject.id,
          state = %subject.state,
          "write landed after the persistence timeout"
        );
        self.announce(&subject).await;
        Err(self.timed_out())
      }
    }
  }

  pub(crate) fn timed_out(&self) -> WorkflowError { WorkflowError::Timeout(self.timeout) }

  /// Queue a snapshot of `subject` for the configured topic.
  pub async fn announce(&self, subject: &Subject) {
    let record = NotificationRecord::from_subject(subject);
    self.publisher.publish(record, &self.topic).await;
  }

  pub(crate) fn repo(&self) -> &R { &self.repo }

  /// Bound a read by the persistence timeout. Reads have no side effects, so
  /// dropping one half way is harmless.
  pub(crate) async fn bounded<T, F>(&self, op: F) -> Result<T>
  where
    F: Future<Output = Result<T, R::Error>>,
  {
    tokio::time::timeout(self.timeout, op)
      .await
      .map_err(|_| self.timed_out())?
      .map_err(WorkflowError::persistence)
  }

  /// Run a write on its own task and wait for it to settle, however long
  /// that takes past the persistence timeout.
  pub(crate) async fn write<T, Op, Fut>(&self, op: Op) -> Result<Written<T>>
  where
    Op: FnOnce(Arc<R>) -> Fut,
    Fut: Future<Output = Result<T, R::Error>> + Send + 'static,
    T: Send + 'static,
  {
    let mut task = tokio::spawn(op(self.repo.clone()));

    let (joined, late) = match tokio::time::timeout(self.timeout, &mut task).await {
      Ok(joined) => (joined, false),
      Err(_) => {
        tracing::warn!(
          timeout = ?self.timeout,
          "write overran the persistence timeout; waiting for it to settle"
        );
        (task.await, true)
      }
    };

    let value = joined
      .map_err(WorkflowError::persistence)?
      .map_err(WorkflowError::persistence)?;
    Ok(if late { Written::Late(value) } else { Written::InTime(value) })
  }
}

/// How a write settled.
#[derive(Debug)]
pub(crate) enum Written<T> {
  /// Within the persistence timeout.
  InTime(T),
  /// After the timeout had expired. The write is durable, but the caller is
  /// owed a [`WorkflowError::Timeout`].
  Late(T),
}
