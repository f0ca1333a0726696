//! A state machine instance bound to a single subject.
//!
//! Instances are cheap and short-lived: one is built per incoming event,
//! positioned at the subject's persisted state, fed exactly one event, and
//! dropped. The pre-transition action is a plain function value supplied at
//! construction; it runs before the instance commits to the new state and
//! can veto the transition by failing.

use std::future::Future;

use crate::{
  state::{Event, State},
  subject::SubjectId,
  transition::TransitionTable,
};

/// The transition about to happen, handed to the pre-transition action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
  pub subject_id: SubjectId,
  pub from:       State,
  pub to:         State,
  pub event:      Event,
}

/// Result of feeding one event to a [`StateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// The event was applicable and the pre-transition action succeeded.
  Accepted { from: State, to: State },
  /// The event has no entry for the current state. Nothing ran.
  Rejected { state: State, event: Event },
}

impl Outcome {
  pub fn is_accepted(&self) -> bool { matches!(self, Self::Accepted { .. }) }

  /// The state the instance is in after the event.
  pub fn state(&self) -> State {
    match self {
      Self::Accepted { to, .. } => *to,
      Self::Rejected { state, .. } => *state,
    }
  }
}

/// One subject's lifecycle, positioned at a known state.
pub struct StateMachine<A> {
  subject_id: SubjectId,
  state:      State,
  table:      &'static TransitionTable,
  action:     A,
}

impl<A> StateMachine<A> {
  pub fn new(
    subject_id: SubjectId,
    state: State,
    table: &'static TransitionTable,
    action: A,
  ) -> Self {
    Self { subject_id, state, table, action }
  }

  pub fn state(&self) -> State { self.state }

  pub fn subject_id(&self) -> SubjectId { self.subject_id }

  /// Apply `event`.
  ///
  /// If the table has an entry for the current state, the pre-transition
  /// action runs first. Should it fail, the instance stays where it was and
  /// the failure is returned. Self-transitions still run the action.
  pub async fn send<Fut, E>(&mut self, event: Event) -> Result<Outcome, E>
  where
    A: FnMut(PendingTransition) -> Fut,
    Fut: Future<Output = Result<(), E>>,
  {
    let from = self.state;
    let Some(transition) = self.table.lookup(from, event).copied() else {
      tracing::debug!(
        subject_id = self.subject_id,
        state = %from,
        event = %event,
        "event not applicable in current state"
      );
      return Ok(Outcome::Rejected { state: from, event });
    };

    let pending = PendingTransition {
      subject_id: self.subject_id,
      from,
      to: transition.target,
      event,
    };
    (self.action)(pending).await?;

    if let Some(action) = transition.action {
      action(&transition);
    }

    self.state = transition.target;
    tracing::info!(
      subject_id = self.subject_id,
      event = %event,
      "state changed from: {from}, to: -> {}",
      transition.target,
    );

    Ok(Outcome::Accepted { from, to: transition.target })
  }
}
