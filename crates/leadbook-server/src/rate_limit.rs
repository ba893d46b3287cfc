//! Fixed-window, per-client request limiting for the `/api` routes.

use std::{
  collections::HashMap,
  net::SocketAddr,
  sync::{Arc, Mutex, PoisonError},
  time::{Duration, Instant},
};

use axum::{
  extract::{ConnectInfo, Request, State},
  middleware::Next,
  response::Response,
};

use crate::error::Error;

/// Most clients tracked at once. A new client arriving at capacity evicts
/// expired windows first, then the oldest live one.
pub const MAX_CLIENTS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
  /// Requests allowed per client per window.
  pub max:             u32,
  pub window:          Duration,
  /// Key clients by the first `X-Forwarded-For` address instead of the peer.
  /// Only safe behind a proxy that overwrites the header.
  pub trust_forwarded: bool,
}

#[derive(Debug, Clone, Copy)]
struct Window {
  started: Instant,
  count:   u32,
}

/// Request counts per client key within the current window.
#[derive(Debug)]
pub struct RateLimiter {
  config:  RateLimitConfig,
  windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
  pub fn new(config: RateLimitConfig) -> Self {
    Self { config, windows: Mutex::new(HashMap::new()) }
  }

  /// Count one request from `key`; `false` once the window's quota is spent.
  pub fn check(&self, key: &str) -> bool { self.check_at(key, Instant::now()) }

  pub fn check_at(&self, key: &str, now: Instant) -> bool {
    let window = self.config.window;
    let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

    if windows.len() >= MAX_CLIENTS && !windows.contains_key(key) {
      windows.retain(|_, w| now.duration_since(w.started) < window);
      if windows.len() >= MAX_CLIENTS {
        let oldest = windows
          .iter()
          .min_by_key(|(_, w)| w.started)
          .map(|(k, _)| k.clone());
        if let Some(oldest) = oldest {
          windows.remove(&oldest);
        }
      }
    }

    let entry = windows
      .entry(key.to_owned())
      .or_insert(Window { started: now, count: 0 });
    if now.duration_since(entry.started) >= window {
      *entry = Window { started: now, count: 0 };
    }
    if entry.count >= self.config.max {
      return false;
    }
    entry.count += 1;
    true
  }
}

/// The peer address, else a shared `unknown` bucket. With `trust_forwarded`
/// the first `X-Forwarded-For` address takes precedence.
pub fn client_key(req: &Request, trust_forwarded: bool) -> String {
  if trust_forwarded {
    let forwarded = req
      .headers()
      .get("x-forwarded-for")
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.split(',').next())
      .map(str::trim)
      .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
      return ip.to_owned();
    }
  }

  req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string())
    .unwrap_or_else(|| "unknown".to_owned())
}

pub async fn limit_requests(
  State(limiter): State<Arc<RateLimiter>>,
  req: Request,
  next: Next,
) -> Result<Response, Error> {
  let key = client_key(&req, limiter.config.trust_forwarded);
  if !limiter.check(&key) {
    tracing::warn!(client = %key, "rate limit exceeded");
    return Err(Error::RateLimited);
  }
  Ok(next.run(req).await)
}
