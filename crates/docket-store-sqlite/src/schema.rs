//! SQL schema for the Docket SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    state       TEXT NOT NULL,   -- State label, e.g. 'IN_CHECK'
    attributes  TEXT NOT NULL DEFAULT '{}',   -- JSON object
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at  TEXT NOT NULL    -- RFC 3339 UTC; bumped on every save
);

CREATE INDEX IF NOT EXISTS subjects_state_idx ON subjects(state);

PRAGMA user_version = 1;
";
