//! Delivery callbacks.

use docket_core::notification::{DeliveryAck, NotificationRecord};

use crate::PublishError;

/// Receives the asynchronous outcome of every published record.
///
/// Called from the publisher's worker task (or, for admission failures, from
/// the publishing task). Implementations must not block.
pub trait DeliveryObserver: Send + Sync + 'static {
  fn delivered(&self, record: &NotificationRecord, ack: &DeliveryAck);

  fn failed(&self, record: &NotificationRecord, error: &PublishError);
}

/// Logs successes at `INFO` and failures at `ERROR`. Failures are not retried.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl DeliveryObserver for LoggingObserver {
  fn delivered(&self, record: &NotificationRecord, ack: &DeliveryAck) {
    tracing::info!(
      subject_id = record.subject_id(),
      state = %record.state(),
      topic = %ack.destination,
      partition = ack.partition,
      offset = ack.offset,
      "notification delivered"
    );
  }

  fn failed(&self, record: &NotificationRecord, error: &PublishError) {
    tracing::error!(
      subject_id = record.subject_id(),
      state = %record.state(),
      error = %error,
      "unable to deliver notification"
    );
  }
}
