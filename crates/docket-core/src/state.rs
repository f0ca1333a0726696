//! The closed lifecycle vocabulary: states a subject can be in, and the
//! events that move it between them.
//!
//! Both enums serialise as `SCREAMING_SNAKE_CASE` labels (`IN_CHECK`,
//! `DEACTIVATE`) on the wire and in storage.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── State ───────────────────────────────────────────────────────────────────

/// Where a subject currently is in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
  /// Freshly created.
  Added,
  /// Attributes were edited after creation; equivalent to `Added` for the
  /// purpose of entering a check.
  Updated,
  InCheck,
  Approved,
  Rejected,
  Active,
  Inactive,
}

impl State {
  /// The label stored in the database and sent in notifications.
  pub fn label(self) -> &'static str { self.into() }

  /// Parse a stored label back into a state.
  pub fn from_label(label: &str) -> Result<Self> {
    label
      .parse()
      .map_err(|_| Error::UnknownState(label.to_owned()))
  }

  /// Terminal states have no outgoing transitions.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Rejected | Self::Active | Self::Inactive)
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// An external input that may move a subject to another state.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
  Add,
  Check,
  Approve,
  Activate,
  Reject,
  Deactivate,
}
