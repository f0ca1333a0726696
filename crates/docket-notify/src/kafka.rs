//! Kafka producer channel.
//!
//! Records are produced with the subject id as the message key, so every
//! notification for one subject lands in the same partition, and the JSON
//! snapshot as the value.

use std::time::Duration;

use docket_core::notification::{DeliveryAck, NotificationChannel};
use rdkafka::{
  ClientConfig,
  error::KafkaError,
  producer::{FutureProducer, FutureRecord},
  util::Timeout,
};

pub struct KafkaChannel {
  producer: FutureProducer,
  timeout:  Duration,
}

impl KafkaChannel {
  /// Create a producer for the comma-separated `brokers`. `timeout` bounds
  /// how long a single record may wait for its broker acknowledgment.
  pub fn new(brokers: &str, timeout: Duration) -> Result<Self, KafkaError> {
    let producer: FutureProducer = ClientConfig::new()
      .set("bootstrap.servers", brokers)
      .set("message.timeout.ms", timeout.as_millis().to_string())
      .set("acks", "all")
      .create()?;

    tracing::info!(brokers, "kafka producer created");
    Ok(Self { producer, timeout })
  }
}

impl NotificationChannel for KafkaChannel {
  type Error = KafkaError;

  async fn submit(
    &self,
    key: &str,
    payload: &[u8],
    destination: &str,
  ) -> Result<DeliveryAck, KafkaError> {
    let record = FutureRecord::to(destination).key(key).payload(payload);

    let (partition, offset) = self
      .producer
      .send(record, Timeout::After(self.timeout))
      .await
      .map_err(|(e, _)| e)?;

    Ok(DeliveryAck {
      destination: destination.to_owned(),
      partition,
      offset,
    })
  }
}
