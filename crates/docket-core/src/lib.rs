//! Core types and trait definitions for the Docket subject workflow.
//!
//! This crate is deliberately free of HTTP, database and broker
//! dependencies. It owns the lifecycle vocabulary (states, events, the
//! transition table), the per-subject state machine, and the two seams the
//! rest of the workspace plugs into: [`store::SubjectRepository`] and
//! [`notification::NotificationChannel`].

pub mod error;
pub mod machine;
pub mod notification;
pub mod state;
pub mod store;
pub mod subject;
pub mod transition;

pub use error::{Error, Result};
