//! dramatis server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite roster store, starts the viewer liveness sweep, and serves the
//! JSON API plus the `/ws` change feed.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use dramatis_api::{AppState, ServerConfig};
use dramatis_roster::{ChangePublisher, RosterService};
use dramatis_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "dramatis roster server")]
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
    .add_source(config::Environment::with_prefix("DRAMATIS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in the store path and open the store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Wire the roster core.
  let publisher = Arc::new(ChangePublisher::new());
  let service = Arc::new(RosterService::new(
    Arc::new(store),
    server_cfg.admin_secret.clone(),
    publisher.clone(),
  ));

  // Fixed-interval liveness sweep over the viewer set.
  let sweep_every = Duration::from_secs(server_cfg.ping_interval_secs);
  tokio::spawn({
    let publisher = publisher.clone();
    async move {
      let mut ticker = tokio::time::interval(sweep_every);
      ticker.tick().await; // the first tick completes immediately
      loop {
        ticker.tick().await;
        publisher.sweep();
      }
    }
  });

  let state = AppState {
    service,
    config: Arc::new(server_cfg.clone()),
  };

  // The roster page is hosted elsewhere, so the API answers cross-origin.
  let app = dramatis_api::router(state)
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
