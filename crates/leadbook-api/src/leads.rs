//! Handlers for `/leads` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/leads` | Filters, sort and pagination from [`ListParams`] |
//! | `GET`  | `/leads/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use leadbook_core::{
  lead::{Lead, LeadSource, LeadStatus},
  query::{DateRange, LeadPage, LeadQuery, SortField, SortOrder, SortSpec},
  store::LeadStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// Raw query string of `GET /leads`.
///
/// Every field is taken as text so that empty values (`?leadStatus=`) mean
/// "no filter" and malformed values produce a JSON 400 rather than an
/// extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub search:      Option<String>,
  pub lead_status: Option<String>,
  pub lead_source: Option<String>,
  pub assigned_to: Option<String>,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
  pub sort_by:     Option<String>,
  pub sort_order:  Option<String>,
  pub page:        Option<String>,
  pub limit:       Option<String>,
}

impl TryFrom<ListParams> for LeadQuery {
  type Error = ApiError;

  fn try_from(p: ListParams) -> Result<Self, Self::Error> {
    let defaults = LeadQuery::default();
    Ok(LeadQuery {
      search:      present(p.search),
      status:      present(p.lead_status)
        .map(|s| LeadStatus::parse(&s))
        .transpose()?,
      source:      present(p.lead_source)
        .map(|s| LeadSource::parse(&s))
        .transpose()?,
      assigned_to: present(p.assigned_to),
      created:     DateRange::parse(p.start_date.as_deref(), p.end_date.as_deref())?,
      sort:        SortSpec {
        field: present(p.sort_by)
          .map(|s| SortField::parse(&s))
          .transpose()?
          .unwrap_or_default(),
        order: present(p.sort_order)
          .map(|s| SortOrder::parse_lenient(&s))
          .unwrap_or_default(),
      },
      page:        present(p.page)
        .map(|s| number("page", &s))
        .transpose()?
        .unwrap_or(defaults.page),
      limit:       present(p.limit)
        .map(|s| number("limit", &s))
        .transpose()?
        .unwrap_or(defaults.limit),
    })
  }
}

fn present(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Integers outside `u32` saturate; the query plan clamps them further.
fn number(name: &str, raw: &str) -> Result<u32, ApiError> {
  let n: i64 = raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("{name} must be an integer, got {raw:?}")))?;
  Ok(n.clamp(0, i64::from(u32::MAX)) as u32)
}

/// `GET /leads[?search=..][&leadStatus=..][&leadSource=..][&assignedTo=..]`
/// `[&startDate=..][&endDate=..][&sortBy=..][&sortOrder=..][&page=..][&limit=..]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<LeadPage>, ApiError>
where
  S: LeadStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let plan = LeadQuery::try_from(params)?.plan();
  let listing = store
    .list_leads(&plan)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(LeadPage::new(listing, plan.page, plan.limit)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /leads/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<Lead>, ApiError>
where
  S: LeadStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id = Uuid::parse_str(&raw_id).map_err(|_| ApiError::MalformedId(raw_id))?;
  let lead = store
    .get_lead(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("Lead not found".into()))?;
  Ok(Json(lead))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params(pairs: &[(&str, &str)]) -> ListParams {
    let mut p = ListParams::default();
    for (k, v) in pairs {
      let v = Some((*v).to_owned());
      match *k {
        "search" => p.search = v,
        "leadStatus" => p.lead_status = v,
        "leadSource" => p.lead_source = v,
        "sortBy" => p.sort_by = v,
        "sortOrder" => p.sort_order = v,
        "page" => p.page = v,
        "limit" => p.limit = v,
        "startDate" => p.start_date = v,
        _ => unreachable!("{k}"),
      }
    }
    p
  }

  #[test]
  fn empty_params_use_defaults() {
    let query = LeadQuery::try_from(ListParams::default()).unwrap();
    assert_eq!(query, LeadQuery::default());
  }

  #[test]
  fn empty_strings_mean_no_filter() {
    let query =
      LeadQuery::try_from(params(&[("leadStatus", ""), ("leadSource", " "), ("search", "")]))
        .unwrap();
    assert_eq!(query.status, None);
    assert_eq!(query.source, None);
    assert_eq!(query.search, None);
  }

  #[test]
  fn parses_enums_and_sort() {
    let query = LeadQuery::try_from(params(&[
      ("leadStatus", "Qualified"),
      ("leadSource", "Trade Show"),
      ("sortBy", "estimatedValue"),
      ("sortOrder", "asc"),
    ]))
    .unwrap();
    assert_eq!(query.status, Some(LeadStatus::Qualified));
    assert_eq!(query.source, Some(LeadSource::TradeShow));
    assert_eq!(query.sort.field, SortField::EstimatedValue);
    assert_eq!(query.sort.order, SortOrder::Asc);
  }

  #[test]
  fn unknown_values_are_bad_requests() {
    for bad in [
      params(&[("sortBy", "password")]),
      params(&[("leadStatus", "Won")]),
      params(&[("page", "two")]),
      params(&[("startDate", "yesterday")]),
    ] {
      assert!(matches!(LeadQuery::try_from(bad), Err(ApiError::BadRequest(_))));
    }
  }

  #[test]
  fn out_of_range_numbers_are_clamped_by_plan() {
    let plan = LeadQuery::try_from(params(&[("page", "-3"), ("limit", "5000")]))
      .unwrap()
      .plan();
    assert_eq!(plan.page, 1);
    assert_eq!(plan.limit, 100);
    assert_eq!(plan.offset, 0);
  }
}
