//! [`SqliteStore`], the SQLite implementation of [`SubjectRepository`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use docket_core::{
  store::{DEFAULT_PAGE_SIZE, SubjectQuery, SubjectRepository},
  subject::{NewSubject, Subject, SubjectId},
};

use crate::{
  Error, Result,
  encode::{RawSubject, SUBJECT_COLUMNS, encode_attributes, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Docket subject store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SubjectRepository impl ──────────────────────────────────────────────────

impl SubjectRepository for SqliteStore {
  type Error = Error;

  async fn find(&self, id: SubjectId) -> Result<Option<Subject>> {
    let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE subject_id = ?1");

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawSubject::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn save(&self, mut subject: Subject) -> Result<Subject> {
    subject.updated_at = Utc::now();

    let id        = subject.id;
    let state_str = subject.state.label();
    let attrs_str = encode_attributes(&subject.attributes)?;
    let at_str    = encode_dt(subject.updated_at);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects
              SET state = ?2, attributes = ?3, updated_at = ?4
            WHERE subject_id = ?1",
          rusqlite::params![id, state_str, attrs_str, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::SubjectNotFound(id));
    }
    Ok(subject)
  }

  async fn insert(&self, input: NewSubject) -> Result<Subject> {
    let now       = Utc::now();
    let state_str = input.state.label();
    let attrs_str = encode_attributes(&input.attributes)?;
    let at_str    = encode_dt(now);

    let id: SubjectId = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (state, attributes, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![state_str, attrs_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Subject {
      id,
      state: input.state,
      attributes: input.attributes,
      created_at: now,
      updated_at: now,
    })
  }

  async fn list(&self, query: SubjectQuery) -> Result<Vec<Subject>> {
    let state_str  = query.state.map(|state| state.label());
    let limit_val  = query.limit.unwrap_or(DEFAULT_PAGE_SIZE) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    let where_clause = if state_str.is_some() { "WHERE state = ?1" } else { "" };
    let sql = format!(
      "SELECT {SUBJECT_COLUMNS} FROM subjects
       {where_clause}
       ORDER BY subject_id
       LIMIT ?2 OFFSET ?3"
    );

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![state_str, limit_val, offset_val],
            RawSubject::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn delete(&self, id: SubjectId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subjects WHERE subject_id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}
