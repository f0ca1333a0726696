//! Publisher tests against in-memory channels.

use std::{
  sync::{Arc, Mutex},
  time::Duration,
};

use chrono::Utc;
use docket_core::{
  notification::{DeliveryAck, NotificationChannel, NotificationRecord},
  state::State,
  subject::{Attributes, Subject, SubjectId},
};
use tokio::sync::Semaphore;

use crate::{
  DeliveryObserver, MemoryChannel, NotificationPublisher, PublishError,
  PublisherConfig,
};

const TOPIC: &str = "subject-events";

fn record(id: SubjectId, state: State) -> NotificationRecord {
  NotificationRecord::from_subject(&Subject {
    id,
    state,
    attributes: Attributes::new(),
    created_at: Utc::now(),
    updated_at: Utc::now(),
  })
}

#[derive(Debug, Clone, PartialEq)]
enum Seen {
  Delivered(SubjectId, i64),
  Failed(SubjectId, String),
}

#[derive(Default)]
struct Recorder {
  seen: Mutex<Vec<Seen>>,
}

impl Recorder {
  fn seen(&self) -> Vec<Seen> { self.seen.lock().unwrap().clone() }
}

impl DeliveryObserver for Recorder {
  fn delivered(&self, record: &NotificationRecord, ack: &DeliveryAck) {
    assert_eq!(ack.destination, TOPIC);
    self
      .seen
      .lock()
      .unwrap()
      .push(Seen::Delivered(record.subject_id(), ack.offset));
  }

  fn failed(&self, record: &NotificationRecord, error: &PublishError) {
    self
      .seen
      .lock()
      .unwrap()
      .push(Seen::Failed(record.subject_id(), error.to_string()));
  }
}

// ─── Delivery ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn records_are_delivered_in_admission_order() {
  let channel = MemoryChannel::new();
  let recorder = Arc::new(Recorder::default());
  let (publisher, handle) = NotificationPublisher::spawn(
    channel.clone(),
    PublisherConfig::default(),
    recorder.clone(),
  );

  publisher.publish(record(1, State::Added), TOPIC).await;
  publisher.publish(record(1, State::InCheck), TOPIC).await;
  publisher.publish(record(2, State::Added), TOPIC).await;
  drop(publisher);
  handle.join().await;

  let states: Vec<_> = channel
    .submitted()
    .iter()
    .map(|s| (s.key.clone(), s.json().unwrap()["state"].clone()))
    .collect();
  assert_eq!(
    states,
    vec![
      ("1".to_owned(), "ADDED".into()),
      ("1".to_owned(), "IN_CHECK".into()),
      ("2".to_owned(), "ADDED".into()),
    ]
  );
  assert_eq!(
    recorder.seen(),
    vec![Seen::Delivered(1, 0), Seen::Delivered(1, 1), Seen::Delivered(2, 2)]
  );
}

#[tokio::test]
async fn refused_delivery_is_reported_not_retried() {
  let channel = MemoryChannel::new();
  channel.set_refuse(true);
  let recorder = Arc::new(Recorder::default());
  let (publisher, handle) = NotificationPublisher::spawn(
    channel.clone(),
    PublisherConfig::default(),
    recorder.clone(),
  );

  publisher.publish(record(5, State::Approved), TOPIC).await;
  drop(publisher);
  handle.join().await;

  assert!(channel.submitted().is_empty());
  let seen = recorder.seen();
  assert_eq!(seen.len(), 1);
  assert!(
    matches!(&seen[0], Seen::Failed(5, msg) if msg.contains(TOPIC)),
    "{seen:?}"
  );
}

#[tokio::test]
async fn shutdown_drains_queue_then_refuses_admission() {
  let channel = MemoryChannel::new();
  let recorder = Arc::new(Recorder::default());
  let (publisher, handle) = NotificationPublisher::spawn(
    channel.clone(),
    PublisherConfig::default(),
    recorder.clone(),
  );

  publisher.publish(record(1, State::Added), TOPIC).await;
  publisher.publish(record(2, State::Added), TOPIC).await;
  handle.shutdown().await;
  publisher.publish(record(3, State::Added), TOPIC).await;

  assert_eq!(channel.submitted().len(), 2);
  assert_eq!(
    recorder.seen(),
    vec![
      Seen::Delivered(1, 0),
      Seen::Delivered(2, 1),
      Seen::Failed(3, PublishError::Closed.to_string()),
    ]
  );
}

// ─── Backpressure ────────────────────────────────────────────────────────────

/// Holds every submission until a permit is released.
struct GatedChannel {
  gate: Arc<Semaphore>,
}

impl NotificationChannel for GatedChannel {
  type Error = std::convert::Infallible;

  async fn submit(
    &self,
    _key: &str,
    _payload: &[u8],
    destination: &str,
  ) -> Result<DeliveryAck, Self::Error> {
    if let Ok(permit) = self.gate.acquire().await {
      permit.forget();
    }
    Ok(DeliveryAck { destination: destination.to_owned(), partition: 0, offset: 0 })
  }
}

#[tokio::test]
async fn full_buffer_rejects_after_admission_window() {
  let gate = Arc::new(Semaphore::new(0));
  let recorder = Arc::new(Recorder::default());
  let (publisher, handle) = NotificationPublisher::spawn(
    GatedChannel { gate: gate.clone() },
    PublisherConfig {
      buffer:            1,
      admission_timeout: Duration::from_millis(50),
    },
    recorder.clone(),
  );

  // First record is picked up by the worker and parks in the gate, the
  // second fills the buffer, the third has nowhere to go.
  publisher.publish(record(1, State::Added), TOPIC).await;
  publisher.publish(record(2, State::Added), TOPIC).await;
  publisher.publish(record(3, State::Added), TOPIC).await;

  assert_eq!(
    recorder.seen(),
    vec![Seen::Failed(3, PublishError::BufferFull(3).to_string())]
  );

  gate.add_permits(2);
  drop(publisher);
  handle.join().await;

  let delivered: Vec<_> = recorder
    .seen()
    .into_iter()
    .filter(|s| matches!(s, Seen::Delivered(..)))
    .collect();
  assert_eq!(delivered, vec![Seen::Delivered(1, 0), Seen::Delivered(2, 0)]);
}
