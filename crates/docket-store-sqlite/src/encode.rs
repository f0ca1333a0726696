//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, states are their labels, and attributes
//! are compact JSON objects.

use chrono::{DateTime, Utc};
use docket_core::{
  state::State,
  subject::{Attributes, Subject, SubjectId},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Attributes ──────────────────────────────────────────────────────────────

pub fn encode_attributes(attributes: &Attributes) -> Result<String> {
  Ok(serde_json::to_string(attributes)?)
}

pub fn decode_attributes(s: &str) -> Result<Attributes> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawSubject::from_row`].
pub const SUBJECT_COLUMNS: &str =
  "subject_id, state, attributes, created_at, updated_at";

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id: SubjectId,
  pub state:      String,
  pub attributes: String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id: row.get(0)?,
      state:      row.get(1)?,
      attributes: row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:         self.subject_id,
      state:      State::from_label(&self.state)?,
      attributes: decode_attributes(&self.attributes)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
