//! Runtime configuration, layered from an optional TOML file and
//! `LEADBOOK_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::Deserialize;

use crate::rate_limit::RateLimitConfig;

pub const ENV_PREFIX: &str = "LEADBOOK";

/// Server configuration. Every field except `jwt_secret` has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  #[serde(default = "default_database_path")]
  pub database_path:          PathBuf,
  /// HMAC secret for signing login tokens. Required to serve.
  pub jwt_secret:             Option<String>,
  /// `*` for any origin, otherwise a comma-separated list of origins.
  #[serde(default = "default_cors_origin")]
  pub cors_origin:            String,
  #[serde(default = "default_auth_email")]
  pub auth_email:             String,
  #[serde(default = "default_auth_password")]
  pub auth_password:          String,
  #[serde(default = "default_auth_name")]
  pub auth_name:              String,
  #[serde(default = "default_connect_timeout_secs")]
  pub connect_timeout_secs:   u64,
  #[serde(default = "default_rate_limit_max")]
  pub rate_limit_max:         u32,
  #[serde(default = "default_rate_limit_window_secs")]
  pub rate_limit_window_secs: u64,
  /// Key rate limits on `X-Forwarded-For`; enable only behind a proxy.
  #[serde(default)]
  pub trust_forwarded_for:    bool,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }
fn default_database_path() -> PathBuf { PathBuf::from("leadbook.db") }
fn default_cors_origin() -> String { "*".into() }
fn default_auth_email() -> String { "admin@crm.com".into() }
fn default_auth_password() -> String { "admin123".into() }
fn default_auth_name() -> String { "Admin User".into() }
fn default_connect_timeout_secs() -> u64 { 5 }
fn default_rate_limit_max() -> u32 { 100 }
fn default_rate_limit_window_secs() -> u64 { 15 * 60 }

impl ServerConfig {
  /// Load from `file` (if given and present) overlaid with the environment.
  pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    builder
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
      .build()?
      .try_deserialize()
  }

  /// Parse a TOML document on its own, without consulting the environment.
  pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(source, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  pub fn bind_address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn connect_timeout(&self) -> Duration {
    Duration::from_secs(self.connect_timeout_secs)
  }

  pub fn rate_limit(&self) -> RateLimitConfig {
    RateLimitConfig {
      max:             self.rate_limit_max,
      window:          Duration::from_secs(self.rate_limit_window_secs),
      trust_forwarded: self.trust_forwarded_for,
    }
  }

  /// The database path with a leading `~` expanded to `$HOME`.
  pub fn database_path(&self) -> PathBuf { expand_tilde(&self.database_path) }
}

fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
