//! JSON REST API for Leadbook.
//!
//! Exposes an axum [`Router`] backed by any [`leadbook_core::store::LeadStore`].
//! Auth, rate limiting and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", leadbook_api::api_router(store.clone()))
//! ```

pub mod analytics;
pub mod error;
pub mod leads;

use std::sync::Arc;

use axum::{Router, routing::get};
use leadbook_core::store::LeadStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: LeadStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/leads", get(leads::list::<S>))
    .route("/leads/{id}", get(leads::get_one::<S>))
    .route("/analytics", get(analytics::handler::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::{DateTime, Utc};
  use leadbook_core::lead::{LeadStatus, NewLead};
  use leadbook_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  fn lead(first: &str, company: &str, status: LeadStatus, created: &str) -> NewLead {
    NewLead {
      first_name: first.into(),
      last_name: "Tester".into(),
      email: format!("{first}@example.com"),
      company: Some(company.into()),
      lead_status: status,
      estimated_value: 2_500.0,
      created_at: Some(
        DateTime::parse_from_rfc3339(created)
          .unwrap()
          .with_timezone(&Utc),
      ),
      ..NewLead::default()
    }
  }

  async fn make_store() -> Arc<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .insert_many(vec![
        lead("ada", "Acme Corp", LeadStatus::New, "2024-03-01T09:00:00Z"),
        lead("bob", "Globex", LeadStatus::New, "2024-03-10T09:00:00Z"),
        lead("cy", "Initech", LeadStatus::Converted, "2024-03-20T09:00:00Z"),
        lead("dee", "Umbrella", LeadStatus::Lost, "2024-04-02T09:00:00Z"),
      ])
      .await
      .unwrap();
    Arc::new(store)
  }

  async fn get_json(store: Arc<SqliteStore>, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = api_router(store).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  // ── List ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_returns_page_envelope() {
    let (status, body) = get_json(make_store().await, "/leads?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    // Newest first by default.
    assert_eq!(body["data"][0]["firstName"], "dee");
    assert!(body["data"][0]["_id"].is_string());
  }

  #[tokio::test]
  async fn list_search_matches_company() {
    let (status, body) = get_json(make_store().await, "/leads?search=acme").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["company"], "Acme Corp");
  }

  #[tokio::test]
  async fn list_filters_by_status_and_date() {
    let uri = "/leads?leadStatus=New&startDate=2024-03-10&endDate=2024-03-31";
    let (_, body) = get_json(make_store().await, uri).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["firstName"], "bob");
  }

  #[tokio::test]
  async fn list_sort_ascending_by_name() {
    let (_, body) =
      get_json(make_store().await, "/leads?sortBy=firstName&sortOrder=asc").await;
    let names: Vec<_> = body["data"]
      .as_array()
      .unwrap()
      .iter()
      .map(|l| l["firstName"].as_str().unwrap().to_owned())
      .collect();
    assert_eq!(names, ["ada", "bob", "cy", "dee"]);
  }

  #[tokio::test]
  async fn list_unknown_sort_field_is_400() {
    let (status, body) = get_json(make_store().await, "/leads?sortBy=secret").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("secret"));
  }

  // ── Get one ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_one_round_trips_listing_id() {
    let store = make_store().await;
    let (_, listing) = get_json(store.clone(), "/leads?search=globex").await;
    let id = listing["data"][0]["_id"].as_str().unwrap().to_owned();

    let (status, body) = get_json(store, &format!("/leads/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "bob@example.com");
  }

  #[tokio::test]
  async fn get_unknown_id_is_404() {
    let uri = format!("/leads/{}", Uuid::new_v4());
    let (status, body) = get_json(make_store().await, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Lead not found");
  }

  #[tokio::test]
  async fn get_malformed_id_is_500() {
    let (status, body) = get_json(make_store().await, "/leads/not-a-uuid").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("not-a-uuid"));
  }

  // ── Analytics ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn analytics_over_all_leads() {
    let (status, body) = get_json(make_store().await, "/analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalLeads"], 4);
    assert_eq!(body["convertedLeads"], 1);
    assert_eq!(body["conversionRate"], "25.00");
    assert_eq!(body["leadsByStatus"]["New"], 2);
    assert_eq!(body["leadsByStatus"]["Lost"], 1);
    assert!(body["leadsByStatus"].get("Contacted").is_none());
    assert_eq!(body["totalPipelineValue"], 10_000.0);
  }

  #[tokio::test]
  async fn analytics_scoped_by_range() {
    let uri = "/analytics?startDate=2024-04-01&endDate=2024-04-30";
    let (_, body) = get_json(make_store().await, uri).await;
    assert_eq!(body["totalLeads"], 1);
    assert_eq!(body["conversionRate"], "0.00");
  }

  #[tokio::test]
  async fn analytics_on_empty_store_reports_zero_rate() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (_, body) = get_json(store, "/analytics").await;
    assert_eq!(body["totalLeads"], 0);
    assert_eq!(body["conversionRate"], 0);
    assert_eq!(body["totalPipelineValue"], 0.0);
  }

  #[tokio::test]
  async fn analytics_rejects_bad_dates() {
    let (status, _) = get_json(make_store().await, "/analytics?endDate=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
