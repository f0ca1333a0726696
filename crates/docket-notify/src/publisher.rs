//! [`NotificationPublisher`]: bounded, fire-and-forget publishing.

use std::{sync::Arc, time::Duration};

use docket_core::notification::{NotificationChannel, NotificationRecord};
use tokio::{
  sync::{
    Notify,
    mpsc::{self, error::SendTimeoutError},
  },
  task::JoinHandle,
};

use crate::{DeliveryObserver, PublishError};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Tuning for the outbound buffer.
#[derive(Debug, Clone, Copy)]
pub struct PublisherConfig {
  /// Records that may wait for the worker before admission blocks.
  pub buffer:            usize,
  /// How long `publish` waits for buffer space before dropping a record.
  pub admission_timeout: Duration,
}

impl Default for PublisherConfig {
  fn default() -> Self {
    Self {
      buffer:            1024,
      admission_timeout: Duration::from_millis(100),
    }
  }
}

// ─── Publisher ───────────────────────────────────────────────────────────────

struct Envelope {
  record:      NotificationRecord,
  destination: String,
}

/// Front half of the publisher: cheap to clone, shared by every request.
///
/// Records are submitted to the channel one at a time, in admission order,
/// by a single worker task. The worker stops once every clone of the
/// publisher has been dropped and the buffer is drained.
#[derive(Clone)]
pub struct NotificationPublisher {
  tx:                mpsc::Sender<Envelope>,
  observer:          Arc<dyn DeliveryObserver>,
  admission_timeout: Duration,
}

/// Back half of the publisher: the worker task.
pub struct PublisherHandle {
  worker: JoinHandle<()>,
  close:  Arc<Notify>,
}

impl PublisherHandle {
  /// Wait for the worker to drain the buffer and exit. Only returns once all
  /// [`NotificationPublisher`] clones are gone.
  pub async fn join(self) {
    if let Err(e) = self.worker.await {
      tracing::error!(error = %e, "notification worker panicked");
    }
  }

  /// Close admission, then wait for already queued records to be delivered.
  /// Publishing after this point reports [`PublishError::Closed`].
  pub async fn shutdown(self) {
    self.close.notify_one();
    self.join().await;
  }
}

impl NotificationPublisher {
  /// Start a worker submitting to `channel`. Must be called inside a tokio
  /// runtime.
  pub fn spawn<C: NotificationChannel>(
    channel: C,
    config: PublisherConfig,
    observer: Arc<dyn DeliveryObserver>,
  ) -> (Self, PublisherHandle) {
    let (tx, rx) = mpsc::channel(config.buffer.max(1));
    let close = Arc::new(Notify::new());
    let worker =
      tokio::spawn(run_worker(channel, rx, observer.clone(), close.clone()));

    let publisher = Self {
      tx,
      observer,
      admission_timeout: config.admission_timeout,
    };
    (publisher, PublisherHandle { worker, close })
  }

  /// Queue `record` for delivery to `destination`.
  ///
  /// Returns once the record is admitted to the buffer, or once the
  /// admission window expires. Either way the outcome is reported to the
  /// observer, never to the caller.
  pub async fn publish(&self, record: NotificationRecord, destination: &str) {
    let envelope = Envelope { record, destination: destination.to_owned() };

    match self.tx.send_timeout(envelope, self.admission_timeout).await {
      Ok(()) => {}
      Err(SendTimeoutError::Timeout(envelope)) => {
        let error = PublishError::BufferFull(envelope.record.subject_id());
        self.observer.failed(&envelope.record, &error);
      }
      Err(SendTimeoutError::Closed(envelope)) => {
        self.observer.failed(&envelope.record, &PublishError::Closed);
      }
    }
  }
}

async fn run_worker<C: NotificationChannel>(
  channel: C,
  mut rx: mpsc::Receiver<Envelope>,
  observer: Arc<dyn DeliveryObserver>,
  close: Arc<Notify>,
) {
  let mut closed = false;
  loop {
    let next = tokio::select! {
      next = rx.recv() => next,
      () = close.notified(), if !closed => {
        closed = true;
        rx.close();
        tracing::info!("notification admission closed; draining");
        continue;
      }
    };
    let Some(Envelope { record, destination }) = next else { break };

    match deliver(&channel, &record, &destination).await {
      Ok(ack) => observer.delivered(&record, &ack),
      Err(error) => observer.failed(&record, &error),
    }
  }
  tracing::debug!("notification worker drained");
}

async fn deliver<C: NotificationChannel>(
  channel: &C,
  record: &NotificationRecord,
  destination: &str,
) -> Result<docket_core::notification::DeliveryAck, PublishError> {
  let payload = record.to_json()?;
  let key = record.key();
  channel
    .submit(&key, &payload, destination)
    .await
    .map_err(|e| PublishError::Delivery {
      destination: destination.to_owned(),
      source:      Box::new(e),
    })
}
