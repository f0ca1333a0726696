//! A channel that "delivers" by writing the payload to the log.
//!
//! Useful when running without a broker: every transition still produces a
//! visible, ordered record with offsets that increase per destination.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, PoisonError},
};

use docket_core::notification::{DeliveryAck, NotificationChannel};

#[derive(Debug, Default)]
pub struct LogChannel {
  offsets: Mutex<HashMap<String, i64>>,
}

impl LogChannel {
  pub fn new() -> Self { Self::default() }
}

impl NotificationChannel for LogChannel {
  type Error = Infallible;

  async fn submit(
    &self,
    key: &str,
    payload: &[u8],
    destination: &str,
  ) -> Result<DeliveryAck, Infallible> {
    let offset = {
      let mut offsets = self.offsets.lock().unwrap_or_else(PoisonError::into_inner);
      let next = offsets.entry(destination.to_owned()).or_insert(0);
      let offset = *next;
      *next += 1;
      offset
    };

    tracing::info!(
      topic = destination,
      key,
      offset,
      payload = %String::from_utf8_lossy(payload),
      "notification"
    );

    Ok(DeliveryAck {
      destination: destination.to_owned(),
      partition: 0,
      offset,
    })
  }
}
