//! Asynchronous notification publishing for Docket.
//!
//! [`NotificationPublisher`] accepts [`NotificationRecord`]s on the request
//! path, buffers them in a bounded queue, and hands them to a background
//! worker that submits them to a [`NotificationChannel`]. Delivery outcomes
//! are reported to a [`DeliveryObserver`]; nothing is ever surfaced back to
//! the code that called [`NotificationPublisher::publish`].
//!
//! Channels shipped here:
//!
//! - [`LogChannel`] acknowledges every record by logging it.
//! - [`MemoryChannel`] keeps records in memory; used by tests.
//! - `KafkaChannel` is a Kafka producer, behind the `kafka` feature.
//!
//! [`NotificationRecord`]: docket_core::notification::NotificationRecord
//! [`NotificationChannel`]: docket_core::notification::NotificationChannel

pub mod error;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod log;
pub mod memory;
pub mod observer;
pub mod publisher;

pub use error::PublishError;
#[cfg(feature = "kafka")]
pub use kafka::KafkaChannel;
pub use log::LogChannel;
pub use memory::MemoryChannel;
pub use observer::{DeliveryObserver, LoggingObserver};
pub use publisher::{NotificationPublisher, PublisherConfig, PublisherHandle};

#[cfg(test)]
mod tests;
