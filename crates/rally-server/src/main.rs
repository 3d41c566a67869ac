//! rally-server binary.
//!
//! Reads `rally.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the REST API over HTTP.
//!
//! # Issuing tokens
//!
//! Bearer tokens are minted out of band:
//!
//! ```sh
//! cargo run -p rally-server -- --issue-token alice@example.com
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use rally_api::{
  AppState,
  auth::{digest_token, generate_token},
};
use rally_server::{ServerConfig, app, expand_tilde, load_config};
use rally_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Rally REST server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "rally.toml")]
  config: PathBuf,

  /// Create the user with this email if needed, print a new bearer token for
  /// it and exit. Any previous token of that user stops working.
  #[arg(long, value_name = "EMAIL", conflicts_with = "revoke_token")]
  issue_token: Option<String>,

  /// Invalidate the bearer token of the user with this email and exit.
  #[arg(long, value_name = "EMAIL")]
  revoke_token: Option<String>,
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

  let server_cfg: ServerConfig =
    load_config(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper modes: manage tokens and exit.
  if let Some(email) = cli.issue_token {
    let token = generate_token();
    let identity = store
      .register_token(&email, &digest_token(&token))
      .await
      .with_context(|| format!("failed to issue token for {email}"))?;
    tracing::info!(%identity, %email, "issued bearer token");
    println!("{token}");
    return Ok(());
  }
  if let Some(email) = cli.revoke_token {
    let revoked = store
      .revoke_token(&email)
      .await
      .with_context(|| format!("failed to revoke token for {email}"))?;
    if !revoked {
      anyhow::bail!("no user with email {email}");
    }
    tracing::info!(%email, "revoked bearer token");
    return Ok(());
  }

  let store = Arc::new(store);
  let state = AppState { store: store.clone(), auth: store };

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app(state))
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
