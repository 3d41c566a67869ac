//! Configuration and application assembly for the Rally server binary.

use std::path::{Path, PathBuf};

use axum::Router;
use rally_api::{AppState, api_router};
use rally_core::store::{Authenticator, DocumentStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `rally.toml` and
/// `RALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

/// Layer defaults, the optional TOML file at `path` and the environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 4741)?
    .set_default("store_path", "rally.sqlite3")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("RALLY"))
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The API router with request tracing applied.
pub fn app<S, A>(state: AppState<S, A>) -> Router
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
{
  api_router(state).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use rally_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn config_file_overrides_defaults() {
    let path = std::env::temp_dir()
      .join(format!("rally-config-{}.toml", std::process::id()));
    std::fs::write(&path, "port = 8080\nstore_path = \"/tmp/rally-test.sqlite3\"\n")
      .unwrap();

    let cfg = load_config(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/rally-test.sqlite3"));
    assert!(!cfg.host.is_empty());
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/rally.sqlite3")),
      PathBuf::from(home).join("rally.sqlite3")
    );
    assert_eq!(
      expand_tilde(Path::new("/var/rally.sqlite3")),
      PathBuf::from("/var/rally.sqlite3")
    );
  }

  #[tokio::test]
  async fn traced_app_serves_health() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let state = AppState { store: store.clone(), auth: store };

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = app(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
  }
}
