//! causw-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) layered with
//! `CAUSW_*` environment variables, opens an in-process SQLite store, and
//! serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use causw_api::AppState;
use causw_core::clock::{Clock, SystemClock};
use causw_server::ServerConfig;
use causw_storage_gcs::GcsUploader;
use causw_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "CAUSW platform server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if server_cfg.gcs.bucket.is_empty() {
    tracing::warn!("no storage bucket configured; uploads will be rejected");
  }
  let clock: Arc<dyn Clock> = Arc::new(SystemClock);
  let uploader = GcsUploader::new(server_cfg.gcs.clone(), Arc::clone(&clock))
    .context("failed to build storage client")?;

  let state = AppState {
    store: Arc::new(store),
    uploader: Arc::new(uploader),
    clock,
    policy: server_cfg.locker,
  };

  let app = causw_server::router(state);
  let address = server_cfg.address();

  tracing::info!(
    cooldown_secs = server_cfg.locker.cooldown_secs,
    bucket = %server_cfg.gcs.bucket,
    "Listening on http://{address}"
  );
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
