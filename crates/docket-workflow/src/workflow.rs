//! [`Workflow`]: apply events to subjects, one subject at a time.

use std::{sync::Arc, time::Duration};

use docket_core::{
  machine::{Outcome, PendingTransition, StateMachine},
  state::{Event, State},
  store::{SubjectQuery, SubjectRepository},
  subject::{Attributes, NewSubject, Subject, SubjectId},
  transition,
};
use docket_notify::NotificationPublisher;

use crate::{
  Result, SubjectLocks, TransitionInterceptor, WorkflowError,
  interceptor::Written,
};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
  /// Destination every notification is published to.
  pub topic:               String,
  /// Upper bound on each repository call.
  pub persistence_timeout: Duration,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self {
      topic:               "subject-events".to_owned(),
      persistence_timeout: Duration::from_secs(5),
    }
  }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// What [`Workflow::apply`] did.
#[derive(Debug, Clone)]
pub struct Applied {
  /// The subject as persisted after the attempt.
  pub subject: Subject,
  pub outcome: Outcome,
}

impl Applied {
  /// The persisted state; equals `outcome.state()` unless someone wrote to
  /// the store behind the workflow's back.
  pub fn state(&self) -> State { self.subject.state }

  pub fn accepted(&self) -> bool { self.outcome.is_accepted() }
}

// ─── Workflow ────────────────────────────────────────────────────────────────

pub struct Workflow<R> {
  interceptor: TransitionInterceptor<R>,
  locks:       SubjectLocks,
}

impl<R: SubjectRepository + 'static> Workflow<R> {
  pub fn new(
    repo: Arc<R>,
    publisher: NotificationPublisher,
    config: WorkflowConfig,
  ) -> Self {
    let interceptor = TransitionInterceptor::new(
      repo,
      publisher,
      config.topic,
      config.persistence_timeout,
    );
    Self { interceptor, locks: SubjectLocks::new() }
  }

  /// Feed `event` to the subject's lifecycle.
  ///
  /// Fails with [`WorkflowError::NotFound`] before any state-machine work if
  /// the subject does not exist. A rejected event is `Ok` with
  /// [`Outcome::Rejected`]; a persistence failure leaves the subject where
  /// it was. A [`WorkflowError::Timeout`] is only returned once the overdue
  /// write has settled: if it landed anyway, it has already been announced.
  pub async fn apply(&self, subject_id: SubjectId, event: Event) -> Result<Applied> {
    let _guard = self.locks.acquire(subject_id).await;

    let subject = self.interceptor.load(subject_id).await?;
    let interceptor = &self.interceptor;
    let mut machine = StateMachine::new(
      subject_id,
      subject.state,
      transition::table(),
      move |pending: PendingTransition| interceptor.on_transition(pending),
    );

    let outcome = machine.send(event).await?;
    if let Outcome::Rejected { state, event } = outcome {
      tracing::info!(
        subject_id,
        state = %state,
        event = %event,
        "event rejected in current state"
      );
    }

    // The interceptor is the source of truth for what was persisted.
    let subject = self.interceptor.load(subject_id).await?;
    Ok(Applied { subject, outcome })
  }

  /// [`Workflow::apply`], reduced to the persisted state afterwards.
  pub async fn apply_event(
    &self,
    subject_id: SubjectId,
    event: Event,
  ) -> Result<State> {
    Ok(self.apply(subject_id, event).await?.state())
  }

  /// The subject's persisted state.
  pub async fn current_state(&self, subject_id: SubjectId) -> Result<State> {
    Ok(self.interceptor.load(subject_id).await?.state)
  }

  pub async fn get(&self, subject_id: SubjectId) -> Result<Subject> {
    self.interceptor.load(subject_id).await
  }

  pub async fn list(&self, query: SubjectQuery) -> Result<Vec<Subject>> {
    self.interceptor.bounded(self.interceptor.repo().list(query)).await
  }

  /// Create a subject in [`State::Added`] and announce it.
  pub async fn register(&self, attributes: Attributes) -> Result<Subject> {
    let written = self
      .interceptor
      .write(move |repo| async move {
        repo.insert(NewSubject::new(attributes)).await
      })
      .await?;
    let subject = self.interceptor.settle(written).await?;

    tracing::info!(subject_id = subject.id, "subject registered");
    self.interceptor.announce(&subject).await;
    Ok(subject)
  }

  /// Replace a subject's attributes. The subject moves to
  /// [`State::Updated`], wherever it was, and the change is announced.
  pub async fn amend(
    &self,
    subject_id: SubjectId,
    attributes: Attributes,
  ) -> Result<Subject> {
    let _guard = self.locks.acquire(subject_id).await;

    let mut subject = self.interceptor.load(subject_id).await?;
    let from = subject.state;
    subject.attributes = attributes;
    subject.state = State::Updated;
    let saved = self.interceptor.store(subject).await?;

    tracing::info!(subject_id, "subject amended; state {from} -> {}", saved.state);
    self.interceptor.announce(&saved).await;
    Ok(saved)
  }

  pub async fn remove(&self, subject_id: SubjectId) -> Result<()> {
    let _guard = self.locks.acquire(subject_id).await;

    let written = self
      .interceptor
      .write(move |repo| async move { repo.delete(subject_id).await })
      .await?;
    match written {
      Written::InTime(true) => {
        tracing::info!(subject_id, "subject removed");
        Ok(())
      }
      Written::InTime(false) => Err(WorkflowError::NotFound(subject_id)),
      Written::Late(removed) => {
        tracing::warn!(subject_id, removed, "delete settled after the persistence timeout");
        Err(self.interceptor.timed_out())
      }
    }
  }

  pub fn locks(&self) -> &SubjectLocks { &self.locks }
}
