//! docket server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, starts the notification publisher, and serves
//! the subject API over HTTP under `/api`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use docket_notify::{
  LogChannel, LoggingObserver, NotificationPublisher, PublisherHandle,
};
use docket_server::{ChannelKind, ServerConfig};
use docket_store_sqlite::SqliteStore;
use docket_workflow::Workflow;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Docket subject lifecycle server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("DOCKET").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let (publisher, publisher_handle) = spawn_publisher(&server_cfg)?;
  let workflow = Arc::new(Workflow::new(
    Arc::new(store),
    publisher,
    server_cfg.workflow(),
  ));

  let app = Router::new()
    .nest("/api", docket_api::api_router(workflow.clone()))
    .layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  drop(workflow);
  let drain = server_cfg.delivery_timeout();
  if tokio::time::timeout(drain, publisher_handle.shutdown()).await.is_err() {
    tracing::warn!(
      "notification worker still busy after {drain:?}; pending records dropped"
    );
  }

  Ok(())
}

fn spawn_publisher(
  cfg: &ServerConfig,
) -> anyhow::Result<(NotificationPublisher, PublisherHandle)> {
  let observer = Arc::new(LoggingObserver);

  match cfg.notify.channel {
    ChannelKind::Log => {
      tracing::info!(topic = %cfg.notify.topic, "publishing notifications to the log");
      Ok(NotificationPublisher::spawn(
        LogChannel::new(),
        cfg.publisher(),
        observer,
      ))
    }
    #[cfg(feature = "kafka")]
    ChannelKind::Kafka => {
      let channel = docket_notify::KafkaChannel::new(
        &cfg.notify.brokers,
        cfg.delivery_timeout(),
      )
      .context("failed to create kafka producer")?;
      tracing::info!(topic = %cfg.notify.topic, "publishing notifications to kafka");
      Ok(NotificationPublisher::spawn(channel, cfg.publisher(), observer))
    }
    #[cfg(not(feature = "kafka"))]
    ChannelKind::Kafka => anyhow::bail!(
      "notify.channel = \"kafka\" requires building with the `kafka` feature"
    ),
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
