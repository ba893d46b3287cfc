//! The `LeadStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `leadbook-store-sqlite`).
//! Higher layers (`leadbook-api`, `leadbook-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  lead::{Lead, NewLead},
  metrics::LeadMetrics,
  query::{DateRange, Listing, QueryPlan},
};

/// Abstraction over a lead store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait LeadStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Normalise, validate and persist a single lead. Id and timestamps are
  /// assigned by the store. Fails if the email is already taken.
  fn insert_lead(
    &self,
    input: NewLead,
  ) -> impl Future<Output = Result<Lead, Self::Error>> + Send + '_;

  /// Persist a batch of leads atomically; either all are stored or none.
  /// Returns the number of records written.
  fn insert_many(
    &self,
    inputs: Vec<NewLead>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete every lead. Returns the number of records removed.
  fn clear(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a lead by id. Returns `None` if not found.
  fn get_lead(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Lead>, Self::Error>> + Send + '_;

  /// One page of leads matching `plan.filter`, ordered by `plan.sort`, plus
  /// the total number of matches ignoring pagination.
  fn list_leads<'a>(
    &'a self,
    plan: &'a QueryPlan,
  ) -> impl Future<Output = Result<Listing, Self::Error>> + Send + 'a;

  /// Aggregate metrics over leads created within `range`. The monthly count
  /// uses `month_start` and ignores `range`.
  fn metrics(
    &self,
    range: DateRange,
    month_start: DateTime<Utc>,
  ) -> impl Future<Output = Result<LeadMetrics, Self::Error>> + Send + '_;
}
