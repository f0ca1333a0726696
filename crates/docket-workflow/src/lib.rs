//! The public face of the Docket lifecycle.
//!
//! [`Workflow`] ties the pieces together: it serialises work per subject,
//! rebuilds a [`StateMachine`] at the subject's persisted state, and
//! registers the [`TransitionInterceptor`] as its pre-transition action so
//! that every accepted transition is persisted and then announced.
//!
//! [`StateMachine`]: docket_core::machine::StateMachine

pub mod error;
pub mod interceptor;
pub mod locks;
pub mod workflow;

pub use error::{Result, WorkflowError};
pub use interceptor::TransitionInterceptor;
pub use locks::SubjectLocks;
pub use workflow::{Applied, Workflow, WorkflowConfig};
