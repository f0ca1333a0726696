//! An in-memory channel for tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use docket_core::notification::{DeliveryAck, NotificationChannel};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("memory channel refused record for key {0}")]
pub struct Refused(pub String);

/// One accepted submission.
#[derive(Debug, Clone)]
pub struct Submitted {
  pub destination: String,
  pub key:         String,
  pub payload:     Vec<u8>,
}

impl Submitted {
  /// The payload parsed as JSON.
  pub fn json(&self) -> serde_json::Result<Value> {
    serde_json::from_slice(&self.payload)
  }
}

#[derive(Debug, Default)]
struct Inner {
  submitted: Vec<Submitted>,
  refuse:    bool,
}

/// Records every submission. Clones share the same buffer, so a test can
/// keep one clone and hand the other to the publisher.
#[derive(Debug, Default, Clone)]
pub struct MemoryChannel {
  inner: Arc<Mutex<Inner>>,
}

impl MemoryChannel {
  pub fn new() -> Self { Self::default() }

  /// Refuse (or accept again) every subsequent submission.
  pub fn set_refuse(&self, refuse: bool) { self.lock().refuse = refuse; }

  /// Everything accepted so far, in submission order.
  pub fn submitted(&self) -> Vec<Submitted> { self.lock().submitted.clone() }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl NotificationChannel for MemoryChannel {
  type Error = Refused;

  async fn submit(
    &self,
    key: &str,
    payload: &[u8],
    destination: &str,
  ) -> Result<DeliveryAck, Refused> {
    let mut inner = self.lock();
    if inner.refuse {
      return Err(Refused(key.to_owned()));
    }

    let offset = inner
      .submitted
      .iter()
      .filter(|s| s.destination == destination)
      .count() as i64;
    inner.submitted.push(Submitted {
      destination: destination.to_owned(),
      key:         key.to_owned(),
      payload:     payload.to_vec(),
    });

    Ok(DeliveryAck {
      destination: destination.to_owned(),
      partition: 0,
      offset,
    })
  }
}
