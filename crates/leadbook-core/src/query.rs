//! Lead listing: filter, sort and pagination.
//!
//! A [`LeadQuery`] holds the caller's optional parameters. [`LeadQuery::plan`]
//! turns it into a [`QueryPlan`] (predicate, sort, offset, limit) that store
//! backends translate into their own query language.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
  Error, Result,
  lead::{Lead, LeadSource, LeadStatus},
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// Fields a listing can be ordered by. Wire names are the camelCase JSON keys.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum SortField {
  #[default]
  CreatedAt,
  UpdatedAt,
  FirstName,
  LastName,
  Email,
  Company,
  JobTitle,
  LeadSource,
  LeadStatus,
  AssignedTo,
  EstimatedValue,
  LastContactDate,
}

impl SortField {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSortField(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  /// Anything other than `asc` sorts descending.
  pub fn parse_lenient(s: &str) -> Self {
    if s.eq_ignore_ascii_case("asc") {
      SortOrder::Asc
    } else {
      SortOrder::Desc
    }
  }

  pub fn as_str(self) -> &'static str { self.into() }

  pub fn toggled(self) -> Self {
    match self {
      SortOrder::Asc => SortOrder::Desc,
      SortOrder::Desc => SortOrder::Asc,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
  pub field: SortField,
  pub order: SortOrder,
}

// ─── Date range ──────────────────────────────────────────────────────────────

/// Inclusive bounds on a lead's creation timestamp. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
  pub start: Option<DateTime<Utc>>,
  pub end:   Option<DateTime<Utc>>,
}

impl DateRange {
  /// Parse optional `startDate` / `endDate` parameters.
  ///
  /// A calendar date (`2024-05-31`) expands to the first instant of that day
  /// for `start` and the last instant for `end`, so the whole boundary day is
  /// included. Empty strings are treated as absent.
  pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
    Ok(Self {
      start: start.map(|s| parse_bound(s, Bound::Start)).transpose()?.flatten(),
      end:   end.map(|s| parse_bound(s, Bound::End)).transpose()?.flatten(),
    })
  }

  pub fn since(start: DateTime<Utc>) -> Self {
    Self { start: Some(start), end: None }
  }

  pub fn is_open(&self) -> bool { self.start.is_none() && self.end.is_none() }

  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.start.is_none_or(|s| at >= s) && self.end.is_none_or(|e| at <= e)
  }
}

#[derive(Clone, Copy)]
enum Bound {
  Start,
  End,
}

fn parse_bound(raw: &str, bound: Bound) -> Result<Option<DateTime<Utc>>> {
  let s = raw.trim();
  if s.is_empty() {
    return Ok(None);
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(Some(dt.with_timezone(&Utc)));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(Some(naive.and_utc()));
  }
  let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|_| Error::InvalidDate(s.to_owned()))?;
  let time = match bound {
    Bound::Start => date.and_hms_opt(0, 0, 0),
    Bound::End => date.and_hms_micro_opt(23, 59, 59, 999_999),
  };
  time
    .map(|t| Some(t.and_utc()))
    .ok_or_else(|| Error::InvalidDate(s.to_owned()))
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for listing leads. Every filter is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadQuery {
  /// Case-insensitive substring over first name, last name, email, company.
  pub search:      Option<String>,
  pub status:      Option<LeadStatus>,
  pub source:      Option<LeadSource>,
  /// Exact match on the owning representative.
  pub assigned_to: Option<String>,
  pub created:     DateRange,
  pub sort:        SortSpec,
  /// 1-based.
  pub page:        u32,
  pub limit:       u32,
}

impl Default for LeadQuery {
  fn default() -> Self {
    Self {
      search:      None,
      status:      None,
      source:      None,
      assigned_to: None,
      created:     DateRange::default(),
      sort:        SortSpec::default(),
      page:        1,
      limit:       DEFAULT_PAGE_SIZE,
    }
  }
}

impl LeadQuery {
  /// Build the store-facing plan. Out-of-range page numbers and sizes are
  /// clamped rather than rejected.
  pub fn plan(&self) -> QueryPlan {
    let page = self.page.max(1);
    let limit = self.limit.clamp(1, MAX_PAGE_SIZE);
    QueryPlan {
      filter: LeadFilter {
        search:      non_empty(self.search.as_deref()).map(str::to_lowercase),
        status:      self.status,
        source:      self.source,
        assigned_to: non_empty(self.assigned_to.as_deref()).map(str::to_owned),
        created:     self.created,
      },
      sort: self.sort,
      offset: u64::from(page - 1) * u64::from(limit),
      limit,
      page,
    }
  }
}

/// Conjunction of the active filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
  /// Already lower-cased.
  pub search:      Option<String>,
  pub status:      Option<LeadStatus>,
  pub source:      Option<LeadSource>,
  pub assigned_to: Option<String>,
  pub created:     DateRange,
}

impl LeadFilter {
  pub fn created_within(range: DateRange) -> Self {
    Self { created: range, ..Self::default() }
  }

  pub fn with_status(mut self, status: LeadStatus) -> Self {
    self.status = Some(status);
    self
  }

  /// Reference evaluation of the predicate against an in-memory record.
  pub fn matches(&self, lead: &Lead) -> bool {
    if let Some(needle) = &self.search {
      let hit = [
        Some(lead.first_name.as_str()),
        Some(lead.last_name.as_str()),
        Some(lead.email.as_str()),
        lead.company.as_deref(),
      ]
      .into_iter()
      .flatten()
      .any(|field| field.to_lowercase().contains(needle.as_str()));
      if !hit {
        return false;
      }
    }
    self.status.is_none_or(|s| lead.lead_status == s)
      && self.source.is_none_or(|s| lead.lead_source == s)
      && self
        .assigned_to
        .as_deref()
        .is_none_or(|a| lead.assigned_to.as_deref() == Some(a))
      && self.created.contains(lead.created_at)
  }
}

/// Everything a backend needs to answer one page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
  pub filter: LeadFilter,
  pub sort:   SortSpec,
  pub offset: u64,
  pub limit:  u32,
  /// The effective (clamped) page number, echoed back to the caller.
  pub page:   u32,
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// One page of leads plus the total match count, as returned by a store.
#[derive(Debug, Clone, Default)]
pub struct Listing {
  pub leads: Vec<Lead>,
  pub total: u64,
}

/// Response body of the listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPage {
  pub data:        Vec<Lead>,
  pub total:       u64,
  pub page:        u32,
  pub total_pages: u64,
}

impl LeadPage {
  pub fn new(listing: Listing, page: u32, limit: u32) -> Self {
    Self {
      total_pages: total_pages(listing.total, limit),
      data: listing.leads,
      total: listing.total,
      page,
    }
  }
}

/// `ceil(total / limit)`; zero when there are no matches.
pub fn total_pages(total: u64, limit: u32) -> u64 {
  total.div_ceil(u64::from(limit.max(1)))
}

fn non_empty(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}
