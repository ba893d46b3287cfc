//! HTTP surface for Leadbook.
//!
//! Wraps the [`leadbook_api`] resource routes with login, bearer-token auth,
//! per-client rate limiting, CORS, a health probe and request tracing.
//!
//! | Method | Path | Auth | Rate limited |
//! |--------|------|------|--------------|
//! | `GET`  | `/health` | no | no |
//! | `POST` | `/api/auth/login` | no | yes |
//! | `GET`  | `/api/leads` | bearer | yes |
//! | `GET`  | `/api/leads/:id` | bearer | yes |
//! | `GET`  | `/api/analytics` | bearer | yes |

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod rate_limit;

pub use error::Error;

use std::sync::Arc;

use axum::{
  Json, Router,
  http::HeaderValue,
  middleware,
  routing::{get, post},
};
use leadbook_core::store::LeadStore;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

use auth::AuthConfig;
use config::ServerConfig;
use rate_limit::RateLimiter;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the router.
pub struct AppState<S: LeadStore> {
  pub store:   Arc<S>,
  pub config:  Arc<ServerConfig>,
  pub auth:    Arc<AuthConfig>,
  pub limiter: Arc<RateLimiter>,
}

impl<S: LeadStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   self.store.clone(),
      config:  self.config.clone(),
      auth:    self.auth.clone(),
      limiter: self.limiter.clone(),
    }
  }
}

impl<S: LeadStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Result<Self, Error> {
    Ok(Self {
      store:   Arc::new(store),
      auth:    Arc::new(AuthConfig::from_config(&config)?),
      limiter: Arc::new(RateLimiter::new(config.rate_limit())),
      config:  Arc::new(config),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: LeadStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let protected = leadbook_api::api_router(state.store.clone()).route_layer(
    middleware::from_fn_with_state(state.auth.clone(), auth::require_bearer),
  );

  let api = Router::new()
    .route("/auth/login", post(auth::login))
    .with_state(state.auth.clone())
    .merge(protected)
    .layer(middleware::from_fn_with_state(
      state.limiter.clone(),
      rate_limit::limit_requests,
    ));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(cors_layer(&state.config.cors_origin))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// `*` allows any origin; otherwise a comma-separated allow-list. Entries that
/// are not valid header values are logged and skipped.
pub fn cors_layer(origin: &str) -> CorsLayer {
  let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
  if origin.trim() == "*" {
    return layer.allow_origin(Any);
  }

  let origins: Vec<HeaderValue> = origin
    .split(',')
    .map(str::trim)
    .filter(|o| !o.is_empty())
    .filter_map(|o| match HeaderValue::from_str(o) {
      Ok(v) => Some(v),
      Err(_) => {
        tracing::warn!(origin = o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();
  layer.allow_origin(AllowOrigin::list(origins))
}

// ─── Integration tests ────────────────────────────────────────────────────────
