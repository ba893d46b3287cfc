//! Handler for `GET /analytics`.
//!
//! Metrics are recomputed from the store on every call; `startDate` and
//! `endDate` scope everything except `leadsThisMonth`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Utc;
use leadbook_core::{
  metrics::{LeadMetrics, month_start},
  query::DateRange,
  store::LeadStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
  pub start_date: Option<String>,
  pub end_date:   Option<String>,
}

/// `GET /analytics[?startDate=...][&endDate=...]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<AnalyticsParams>,
) -> Result<Json<LeadMetrics>, ApiError>
where
  S: LeadStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let range = DateRange::parse(params.start_date.as_deref(), params.end_date.as_deref())?;
  let metrics = store
    .metrics(range, month_start(Utc::now()))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(metrics))
}
