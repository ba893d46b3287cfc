//! Async HTTP client wrapping the leadbook JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use leadbook_core::{
  lead::Lead,
  metrics::LeadMetrics,
  query::{LeadPage, LeadQuery},
};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Connection settings for the leadbook API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
  pub email: String,
  pub name:  String,
}

#[derive(Deserialize)]
struct LoginResponse {
  token: String,
  user:  User,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

/// Async HTTP client for the leadbook JSON REST API.
///
/// Call [`ApiClient::login`] once before anything else; the token it returns
/// is attached to every later request.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
  token:  Option<String>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config, token: None })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/login`
  pub async fn login(&mut self) -> Result<User> {
    let resp = self
      .client
      .post(self.url("/auth/login"))
      .json(&json!({ "email": self.config.email, "password": self.config.password }))
      .send()
      .await
      .context("POST /auth/login failed")?;

    let body: LoginResponse = checked(resp, "POST /auth/login")
      .await?
      .json()
      .await
      .context("deserialising login response")?;
    self.token = Some(body.token);
    tracing::info!(email = %body.user.email, "logged in");
    Ok(body.user)
  }

  // ── Leads ─────────────────────────────────────────────────────────────────

  /// `GET /api/leads?...`
  pub async fn list_leads(&self, query: &LeadQuery) -> Result<LeadPage> {
    let resp = self
      .auth(self.client.get(self.url("/leads")))
      .query(&query_pairs(query))
      .send()
      .await
      .context("GET /leads failed")?;
    checked(resp, "GET /leads")
      .await?
      .json()
      .await
      .context("deserialising leads")
  }

  /// `GET /api/leads/<id>`
  pub async fn get_lead(&self, id: Uuid) -> Result<Lead> {
    let resp = self
      .auth(self.client.get(self.url(&format!("/leads/{id}"))))
      .send()
      .await
      .context("GET /leads/:id failed")?;
    checked(resp, "GET /leads/:id")
      .await?
      .json()
      .await
      .context("deserialising lead")
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  /// `GET /api/analytics`
  pub async fn analytics(&self) -> Result<LeadMetrics> {
    let resp = self
      .auth(self.client.get(self.url("/analytics")))
      .send()
      .await
      .context("GET /analytics failed")?;
    checked(resp, "GET /analytics")
      .await?
      .json()
      .await
      .context("deserialising analytics")
  }
}

/// Pass successful responses through; turn others into an error carrying the
/// server's `message` when it sent one.
async fn checked(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  match resp.json::<ErrorBody>().await {
    Ok(body) => Err(anyhow!("{what} → {status}: {}", body.message)),
    Err(_) => Err(anyhow!("{what} → {status}")),
  }
}

/// Query-string pairs for a listing request. Unset filters are omitted.
pub fn query_pairs(query: &LeadQuery) -> Vec<(&'static str, String)> {
  let mut pairs = Vec::new();
  if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
    pairs.push(("search", search.to_owned()));
  }
  if let Some(status) = query.status {
    pairs.push(("leadStatus", status.to_string()));
  }
  if let Some(source) = query.source {
    pairs.push(("leadSource", source.to_string()));
  }
  if let Some(rep) = &query.assigned_to {
    pairs.push(("assignedTo", rep.clone()));
  }
  pairs.push(("sortBy", query.sort.field.to_string()));
  pairs.push(("sortOrder", query.sort.order.to_string()));
  pairs.push(("page", query.page.to_string()));
  pairs.push(("limit", query.limit.to_string()));
  pairs
}

#[cfg(test)]
mod tests {
  use leadbook_core::{
    lead::{LeadSource, LeadStatus},
    query::{SortField, SortOrder, SortSpec},
  };

  use super::*;

  #[test]
  fn default_query_sends_sort_and_paging_only() {
    let pairs = query_pairs(&LeadQuery::default());
    assert_eq!(
      pairs,
      vec![
        ("sortBy", "createdAt".to_owned()),
        ("sortOrder", "desc".to_owned()),
        ("page", "1".to_owned()),
        ("limit", "10".to_owned()),
      ]
    );
  }

  #[test]
  fn filters_use_wire_names() {
    let query = LeadQuery {
      search: Some("acme".into()),
      status: Some(LeadStatus::Contacted),
      source: Some(LeadSource::EmailCampaign),
      sort: SortSpec { field: SortField::EstimatedValue, order: SortOrder::Asc },
      ..LeadQuery::default()
    };
    let pairs = query_pairs(&query);
    assert!(pairs.contains(&("search", "acme".to_owned())));
    assert!(pairs.contains(&("leadStatus", "Contacted".to_owned())));
    assert!(pairs.contains(&("leadSource", "Email Campaign".to_owned())));
    assert!(pairs.contains(&("sortBy", "estimatedValue".to_owned())));
    assert!(pairs.contains(&("sortOrder", "asc".to_owned())));
  }

  #[test]
  fn urls_are_rooted_under_api() {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://localhost:5000/".into(),
      email:    String::new(),
      password: String::new(),
    })
    .unwrap();
    assert_eq!(client.url("/leads"), "http://localhost:5000/api/leads");
  }
}
