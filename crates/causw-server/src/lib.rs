//! HTTP server assembly for the CAUSW platform.
//!
//! Loads [`ServerConfig`] and mounts the JSON API under `/api` behind a
//! request tracing layer.

use std::path::{Path, PathBuf};

use axum::{Router, routing::get};
use causw_api::{AppState, Store};
use causw_core::{settings::LockerPolicy, upload::FileUploader};
use causw_storage_gcs::GcsConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Prefix of environment variables overriding the config file.
pub const ENV_PREFIX: &str = "CAUSW";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAUSW_*` environment variables (nested keys joined with `__`, e.g.
/// `CAUSW_GCS__BUCKET`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub locker:     LockerPolicy,
  pub gcs:        GcsConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".into(),
      port:       8080,
      store_path: PathBuf::from("causw.db"),
      locker:     LockerPolicy::default(),
      gcs:        GcsConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let cfg: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()?;
    cfg.locker.validate().map_err(config::ConfigError::Message)?;
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S, U>(state: AppState<S, U>) -> Router
where
  S: Store,
  U: FileUploader + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", causw_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
