//! Configuration for the `docket` server binary.
//!
//! Values come from `config.toml` (or the path given with `--config`),
//! overridden by `DOCKET__*` environment variables, e.g.
//! `DOCKET__NOTIFY__TOPIC=subjects`.

use std::{path::PathBuf, time::Duration};

use docket_notify::PublisherConfig;
use docket_workflow::WorkflowConfig;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  #[serde(default = "default_store_path")]
  pub store_path:             PathBuf,
  #[serde(default = "default_persistence_timeout_ms")]
  pub persistence_timeout_ms: u64,
  #[serde(default)]
  pub notify:                 NotifyConfig,
}

/// Where notifications go and how much may queue up on the way.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct NotifyConfig {
  pub channel:              ChannelKind,
  pub topic:                String,
  /// Comma-separated `host:port` list; only read by the Kafka channel.
  pub brokers:              String,
  pub buffer:               usize,
  pub admission_timeout_ms: u64,
  pub delivery_timeout_ms:  u64,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
  #[default]
  Log,
  Kafka,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("docket.db") }
fn default_persistence_timeout_ms() -> u64 { 5_000 }

impl Default for NotifyConfig {
  fn default() -> Self {
    Self {
      channel:              ChannelKind::Log,
      topic:                "subject-events".to_owned(),
      brokers:              "localhost:9092".to_owned(),
      buffer:               1024,
      admission_timeout_ms: 100,
      delivery_timeout_ms:  5_000,
    }
  }
}

impl ServerConfig {
  pub fn workflow(&self) -> WorkflowConfig {
    WorkflowConfig {
      topic:               self.notify.topic.clone(),
      persistence_timeout: Duration::from_millis(self.persistence_timeout_ms),
    }
  }

  pub fn publisher(&self) -> PublisherConfig {
    PublisherConfig {
      buffer:            self.notify.buffer,
      admission_timeout: Duration::from_millis(self.notify.admission_timeout_ms),
    }
  }

  pub fn delivery_timeout(&self) -> Duration {
    Duration::from_millis(self.notify.delivery_timeout_ms)
  }
}
