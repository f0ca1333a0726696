//! Subject: the entity whose lifecycle is tracked.
//!
//! The core only cares about the id and the state. Everything else the
//! surrounding application stores about a subject (names, contact details,
//! contract information, ...) rides along as an opaque JSON object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result, state::State};

/// Numeric subject identifier, assigned by the persistence collaborator.
pub type SubjectId = i64;

/// Business attributes opaque to the workflow.
pub type Attributes = serde_json::Map<String, Value>;

/// A persisted subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub id:         SubjectId,
  pub state:      State,
  pub attributes: Attributes,
  /// Set by the store on insert; never changes afterwards.
  pub created_at: DateTime<Utc>,
  /// Bumped by the store on every save.
  pub updated_at: DateTime<Utc>,
}

/// Input to [`crate::store::SubjectRepository::insert`].
/// The id and timestamps are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSubject {
  pub state:      State,
  pub attributes: Attributes,
}

impl NewSubject {
  /// A subject entering the lifecycle at [`State::Added`].
  pub fn new(attributes: Attributes) -> Self {
    Self { state: State::Added, attributes }
  }
}

/// Accept an arbitrary JSON value as a subject's attributes.
/// Only objects are accepted; anything else has no field names to carry.
pub fn attributes_from_value(value: Value) -> Result<Attributes> {
  match value {
    Value::Object(map) => Ok(map),
    Value::Null => Err(Error::AttributesNotObject("null")),
    Value::Bool(_) => Err(Error::AttributesNotObject("a boolean")),
    Value::Number(_) => Err(Error::AttributesNotObject("a number")),
    Value::String(_) => Err(Error::AttributesNotObject("a string")),
    Value::Array(_) => Err(Error::AttributesNotObject("an array")),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn object_attributes_accepted() {
    let attrs =
      attributes_from_value(json!({ "first_name": "Ada", "position": "CTO" }))
        .unwrap();
    assert_eq!(attrs["first_name"], "Ada");
    assert_eq!(NewSubject::new(attrs).state, State::Added);
  }

  #[test]
  fn non_object_attributes_rejected() {
    assert!(matches!(
      attributes_from_value(json!([1, 2])),
      Err(Error::AttributesNotObject("an array"))
    ));
    assert!(attributes_from_value(Value::Null).is_err());
  }
}
