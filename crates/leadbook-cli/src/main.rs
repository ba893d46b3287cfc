//! `leadbook`: terminal dashboard for the leadbook API.
//!
//! # Usage
//!
//! ```text
//! leadbook --url http://localhost:5000 --email admin@crm.com --password admin123
//! leadbook --config ~/.config/leadbook/config.toml
//! ```

mod app;
mod client;
mod ui;

use std::{fs::File, io, path::PathBuf, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "leadbook", about = "Terminal dashboard for leadbook")]
struct Args {
  /// Path to a TOML config file (url, email, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the leadbook server (default: http://localhost:5000).
  #[arg(long, env = "LEADBOOK_URL")]
  url: Option<String>,

  /// Login email.
  #[arg(long, env = "LEADBOOK_EMAIL")]
  email: Option<String>,

  /// Login password (plaintext).
  #[arg(long, env = "LEADBOOK_PASSWORD")]
  password: Option<String>,

  /// Write logs to this file; the terminal is owned by the dashboard.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_owned()) }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    let file = File::create(path)
      .with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
      .with_env_filter(
        EnvFilter::builder()
          .with_default_directive(LevelFilter::INFO.into())
          .from_env_lossy(),
      )
      .with_ansi(false)
      .with_writer(Mutex::new(file))
      .init();
  }

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override the config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| non_empty(&file_cfg.url))
      .unwrap_or_else(|| DEFAULT_URL.to_owned()),
    email:    args.email.or_else(|| non_empty(&file_cfg.email)).unwrap_or_default(),
    password: args
      .password
      .or_else(|| non_empty(&file_cfg.password))
      .unwrap_or_default(),
  };

  let mut client = ApiClient::new(api_config)?;
  let user = client.login().await.context("login failed")?;
  let mut app = App::new(client, user.name);

  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore the terminal even on error.
  let run_result = match app.load_initial().await {
    Ok(()) => run_event_loop(&mut terminal, &mut app).await,
    Err(e) => Err(e),
  };

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
