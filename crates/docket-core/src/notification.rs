//! Notification records and the channel they are announced on.
//!
//! A [`NotificationRecord`] is an immutable snapshot of a subject taken
//! right after its new state was persisted. It is serialised to JSON as a
//! flat object: the subject id, every business attribute, and the state
//! label.
//!
//! ```json
//! { "id": 42, "first_name": "Ada", "position": "CTO", "state": "IN_CHECK" }
//! ```

use std::future::Future;

use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::{
  Result,
  state::State,
  subject::{Attributes, Subject, SubjectId},
};

// ─── Record ──────────────────────────────────────────────────────────────────

/// Immutable snapshot of a subject, handed to the notification publisher.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
  subject_id: SubjectId,
  state:      State,
  attributes: Attributes,
}

impl NotificationRecord {
  /// Snapshot `subject` as it is now.
  pub fn from_subject(subject: &Subject) -> Self {
    Self {
      subject_id: subject.id,
      state:      subject.state,
      attributes: subject.attributes.clone(),
    }
  }

  pub fn subject_id(&self) -> SubjectId { self.subject_id }

  pub fn state(&self) -> State { self.state }

  pub fn attributes(&self) -> &Attributes { &self.attributes }

  /// Partitioning key: all records for one subject share a key.
  pub fn key(&self) -> String { self.subject_id.to_string() }

  /// The JSON payload submitted to the channel.
  pub fn to_json(&self) -> Result<Vec<u8>> { Ok(serde_json::to_vec(self)?) }
}

impl Serialize for NotificationRecord {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    // `id` and `state` are owned by the workflow; attributes of the same name
    // are shadowed rather than emitted twice.
    let attributes = self
      .attributes
      .iter()
      .filter(|(name, _)| !matches!(name.as_str(), "id" | "state"));

    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("id", &self.subject_id)?;
    for (name, value) in attributes {
      map.serialize_entry(name, value)?;
    }
    map.serialize_entry("state", &self.state)?;
    map.end()
  }
}

// ─── Channel ─────────────────────────────────────────────────────────────────

/// Broker coordinates of a delivered record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAck {
  pub destination: String,
  pub partition:   i32,
  pub offset:      i64,
}

/// An at-least-once publish primitive (a Kafka topic, a log sink, an
/// in-memory buffer in tests).
///
/// `submit` resolves once the channel has either acknowledged or refused the
/// payload. Callers are expected to await it off the request path.
pub trait NotificationChannel: Send + Sync + 'static {
  type Error: std::error::Error + Send + Sync + 'static;

  fn submit<'a>(
    &'a self,
    key: &'a str,
    payload: &'a [u8],
    destination: &'a str,
  ) -> impl Future<Output = Result<DeliveryAck, Self::Error>> + Send + 'a;
}
