//! Login against the configured credential pair, JWT issuing, and the bearer
//! token middleware guarding the lead routes.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Request, State, rejection::JsonRejection},
  http::header,
  middleware::Next,
  response::Response,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::ServerConfig, error::Error};

/// Lifetime of an issued token, in days.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub email: String,
  pub name:  String,
  /// Issued at (unix timestamp).
  pub iat:   i64,
  /// Expiration (unix timestamp).
  pub exp:   i64,
}

// ─── Keys ─────────────────────────────────────────────────────────────────────

/// HS256 signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct JwtKeys {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl JwtKeys {
  pub fn new(secret: &str) -> Self {
    Self {
      encoding:   EncodingKey::from_secret(secret.as_bytes()),
      decoding:   DecodingKey::from_secret(secret.as_bytes()),
      validation: Validation::default(),
    }
  }

  pub fn issue(&self, email: &str, name: &str) -> Result<String, Error> {
    self.issue_at(email, name, Utc::now())
  }

  pub fn issue_at(
    &self,
    email: &str,
    name: &str,
    now: DateTime<Utc>,
  ) -> Result<String, Error> {
    let claims = Claims {
      email: email.to_owned(),
      name:  name.to_owned(),
      iat:   now.timestamp(),
      exp:   (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    Ok(jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)?)
  }

  /// Decode and validate signature and expiry.
  pub fn verify(&self, token: &str) -> Result<Claims, Error> {
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        Error::InvalidToken
      })
  }
}

// ─── Config ───────────────────────────────────────────────────────────────────

/// The single accepted credential pair plus the token keys.
#[derive(Clone)]
pub struct AuthConfig {
  pub email:    String,
  pub password: String,
  pub name:     String,
  pub keys:     JwtKeys,
}

impl AuthConfig {
  pub fn from_config(config: &ServerConfig) -> Result<Self, Error> {
    let secret = config
      .jwt_secret
      .as_deref()
      .filter(|s| !s.is_empty())
      .ok_or(Error::MissingSecret)?;
    Ok(Self {
      email:    config.auth_email.clone(),
      password: config.auth_password.clone(),
      name:     config.auth_name.clone(),
      keys:     JwtKeys::new(secret),
    })
  }
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUser {
  pub email: String,
  pub name:  String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  LoginUser,
}

/// `POST /auth/login` with body `{"email":"...","password":"..."}`
pub async fn login(
  State(auth): State<Arc<AuthConfig>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<LoginResponse>, Error> {
  let Json(body) = body.map_err(|_| Error::MissingCredentials)?;
  let (Some(email), Some(password)) = (
    body.email.filter(|s| !s.is_empty()),
    body.password.filter(|s| !s.is_empty()),
  ) else {
    return Err(Error::MissingCredentials);
  };

  if email != auth.email || password != auth.password {
    tracing::warn!(%email, "login rejected");
    return Err(Error::InvalidCredentials);
  }

  let token = auth.keys.issue(&auth.email, &auth.name)?;
  tracing::info!(%email, "login succeeded");
  Ok(Json(LoginResponse {
    token,
    user: LoginUser {
      email: auth.email.clone(),
      name:  auth.name.clone(),
    },
  }))
}

// ─── Middleware ───────────────────────────────────────────────────────────────

/// Require `Authorization: Bearer <token>`; verified claims are stored in the
/// request extensions.
pub async fn require_bearer(
  State(auth): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let token = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
    .filter(|t| !t.is_empty())
    .ok_or(Error::MissingToken)?;

  let claims = auth.keys.verify(token)?;
  req.extensions_mut().insert(claims);
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn issue_and_verify() {
    let keys = JwtKeys::new("secret");
    let token = keys.issue("admin@crm.com", "Admin User").unwrap();
    let claims = keys.verify(&token).unwrap();
    assert_eq!(claims.email, "admin@crm.com");
    assert_eq!(claims.name, "Admin User");
    assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
  }

  #[test]
  fn wrong_secret_rejected() {
    let token = JwtKeys::new("secret-a").issue("a@b.c", "A").unwrap();
    assert!(matches!(
      JwtKeys::new("secret-b").verify(&token),
      Err(Error::InvalidToken)
    ));
  }

  #[test]
  fn expired_token_rejected() {
    let keys = JwtKeys::new("secret");
    let token = keys
      .issue_at("a@b.c", "A", Utc::now() - Duration::days(8))
      .unwrap();
    assert!(matches!(keys.verify(&token), Err(Error::InvalidToken)));
  }

  #[test]
  fn garbage_rejected() {
    let keys = JwtKeys::new("secret");
    assert!(matches!(keys.verify("not.a.jwt"), Err(Error::InvalidToken)));
  }

  #[test]
  fn missing_secret_is_an_error() {
    let cfg = ServerConfig::from_toml(r#"jwt_secret = """#).unwrap();
    assert!(matches!(AuthConfig::from_config(&cfg), Err(Error::MissingSecret)));
  }
}
