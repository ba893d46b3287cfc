//! leadbook-server binary.
//!
//! `serve` (the default) opens the SQLite store named in the configuration and
//! serves the JSON API over HTTP. `seed` wipes the store and fills it with
//! synthetic leads.
//!
//! Configuration comes from an optional TOML file (`--config`) overlaid with
//! `LEADBOOK_*` environment variables, e.g. `LEADBOOK_JWT_SECRET`.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use leadbook_core::{
  seed::{DEFAULT_SEED_COUNT, LeadGenerator},
  store::LeadStore,
};
use leadbook_server::{AppState, backend::Backend, config::ServerConfig};
use leadbook_store_sqlite::SqliteStore;
use rand::{SeedableRng, rngs::StdRng};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Leadbook API server")]
struct Cli {
  /// Path to an optional TOML configuration file.
  #[arg(short, long, env = "LEADBOOK_CONFIG")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (default).
  Serve,
  /// Delete every lead and insert freshly generated ones.
  Seed {
    /// Number of leads to generate.
    #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
    count: usize,
    /// Seed for the random generator; omit for a random seed.
    #[arg(long)]
    rng_seed: Option<u64>,
  },
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

  let config = ServerConfig::load(cli.config.as_deref())
    .context("failed to load configuration")?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(config).await,
    Command::Seed { count, rng_seed } => seed(config, count, rng_seed).await,
  }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
  let store = Backend::connect(&config.database_path(), config.connect_timeout()).await;
  let address = config.bind_address();

  let state = AppState::new(store, config).context("invalid auth configuration")?;
  let app = leadbook_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(
    listener,
    app.into_make_service_with_connect_info::<SocketAddr>(),
  )
  .await
  .context("server error")?;

  Ok(())
}

async fn seed(config: ServerConfig, count: usize, rng_seed: Option<u64>) -> anyhow::Result<()> {
  let path = config.database_path();
  let store = tokio::time::timeout(config.connect_timeout(), SqliteStore::open(&path))
    .await
    .with_context(|| format!("timed out opening store at {path:?}"))?
    .with_context(|| format!("failed to open store at {path:?}"))?;

  let removed = store.clear().await.context("failed to clear leads")?;
  tracing::info!(removed, "cleared existing leads");

  let rng = match rng_seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };
  let leads = LeadGenerator::new(rng, Utc::now()).generate_batch(count);
  let written = store
    .insert_many(leads)
    .await
    .context("failed to insert generated leads")?;

  tracing::info!(written, path = %path.display(), "seeded leads");
  Ok(())
}
