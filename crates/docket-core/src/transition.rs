//! The transition table: which events are legal in which states, and where
//! they lead.
//!
//! The table is pure data. It is built once, on first access, from the
//! literal [`TRANSITIONS`] list and is never mutated afterwards, so any
//! number of state machines may read it concurrently without locking.

use std::{collections::HashMap, sync::LazyLock};

use strum::IntoEnumIterator as _;

use crate::state::{Event, State};

/// An infallible side effect attached to a transition. Runs once the
/// transition has been committed by the pre-transition action.
pub type TransitionAction = fn(&Transition);

/// A single `(source, event) → target` edge.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
  pub source: State,
  pub event:  Event,
  pub target: State,
  pub action: Option<TransitionAction>,
}

impl Transition {
  const fn new(source: State, event: Event, target: State) -> Self {
    Self { source, event, target, action: None }
  }

  const fn with_action(mut self, action: TransitionAction) -> Self {
    self.action = Some(action);
    self
  }

  pub fn is_self_transition(&self) -> bool { self.source == self.target }
}

/// Logs the exit and entry of a subject moving into a check.
fn check_action(transition: &Transition) {
  tracing::info!(
    from = %transition.source,
    to = %transition.target,
    "check action: exiting {}, entering {}",
    transition.source,
    transition.target,
  );
}

/// Every legal transition. `Rejected`, `Active` and `Inactive` never appear
/// as a source.
pub const TRANSITIONS: &[Transition] = &[
  Transition::new(State::Added, Event::Add, State::Added),
  Transition::new(State::Added, Event::Check, State::InCheck)
    .with_action(check_action),
  Transition::new(State::Updated, Event::Check, State::InCheck)
    .with_action(check_action),
  Transition::new(State::InCheck, Event::Approve, State::Approved),
  Transition::new(State::InCheck, Event::Reject, State::Rejected),
  Transition::new(State::Approved, Event::Activate, State::Active),
  Transition::new(State::Approved, Event::Deactivate, State::Inactive),
];

static TABLE: LazyLock<TransitionTable> =
  LazyLock::new(|| TransitionTable::from_transitions(TRANSITIONS));

/// The process-wide transition table.
pub fn table() -> &'static TransitionTable { &TABLE }

/// The edges the table was built from, in declaration order.
pub fn transitions() -> &'static [Transition] { TRANSITIONS }

// ─── Table ───────────────────────────────────────────────────────────────────

/// Exact-match lookup from `(state, event)` to a [`Transition`].
#[derive(Debug)]
pub struct TransitionTable {
  entries: HashMap<(State, Event), Transition>,
}

impl TransitionTable {
  /// Build a table from a list of edges. A later edge for the same
  /// `(source, event)` pair replaces an earlier one.
  pub fn from_transitions(transitions: &[Transition]) -> Self {
    let entries = transitions
      .iter()
      .map(|t| ((t.source, t.event), *t))
      .collect();
    Self { entries }
  }

  /// The target state for `event` in `state`, or `None` if the event is not
  /// applicable there.
  pub fn resolve(&self, state: State, event: Event) -> Option<State> {
    self.lookup(state, event).map(|t| t.target)
  }

  /// The full edge for `event` in `state`, including its action.
  pub fn lookup(&self, state: State, event: Event) -> Option<&Transition> {
    self.entries.get(&(state, event))
  }

  /// Events accepted in `state`, in declaration order of [`Event`].
  pub fn events_from(&self, state: State) -> Vec<Event> {
    Event::iter()
      .filter(|event| self.entries.contains_key(&(state, *event)))
      .collect()
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DOCUMENTED: &[(State, Event, State)] = &[
    (State::Added, Event::Add, State::Added),
    (State::Added, Event::Check, State::InCheck),
    (State::Updated, Event::Check, State::InCheck),
    (State::InCheck, Event::Approve, State::Approved),
    (State::InCheck, Event::Reject, State::Rejected),
    (State::Approved, Event::Activate, State::Active),
    (State::Approved, Event::Deactivate, State::Inactive),
  ];

  #[test]
  fn documented_pairs_resolve_to_their_target() {
    for (source, event, target) in DOCUMENTED {
      assert_eq!(
        table().resolve(*source, *event),
        Some(*target),
        "{source} --{event}-->"
      );
    }
    assert_eq!(table().len(), DOCUMENTED.len());
    assert_eq!(transitions().len(), DOCUMENTED.len());
  }

  #[test]
  fn every_other_pair_is_rejected() {
    for state in State::iter() {
      for event in Event::iter() {
        let documented = DOCUMENTED
          .iter()
          .any(|(s, e, _)| *s == state && *e == event);
        if !documented {
          assert_eq!(table().resolve(state, event), None, "{state} --{event}-->");
        }
      }
    }
  }

  #[test]
  fn terminal_states_have_no_outgoing_events() {
    for state in State::iter().filter(|s| s.is_terminal()) {
      assert!(table().events_from(state).is_empty(), "{state}");
    }
  }

  #[test]
  fn events_from_lists_applicable_events() {
    assert_eq!(table().events_from(State::Added), vec![Event::Add, Event::Check]);
    assert_eq!(
      table().events_from(State::InCheck),
      vec![Event::Approve, Event::Reject]
    );
  }

  #[test]
  fn only_check_transitions_carry_an_action() {
    for t in TRANSITIONS {
      assert_eq!(t.action.is_some(), t.event == Event::Check, "{:?}", t);
    }
  }

  #[test]
  fn add_is_the_only_self_transition() {
    let selfs: Vec<_> =
      TRANSITIONS.iter().filter(|t| t.is_self_transition()).collect();
    assert_eq!(selfs.len(), 1);
    assert_eq!(selfs[0].event, Event::Add);
  }
}
