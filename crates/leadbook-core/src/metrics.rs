//! Aggregate lead metrics reported by the analytics endpoint.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::lead::LeadStatus;

/// Converted leads as a percentage of all leads in scope, held in hundredths
/// of a percent and rounded half-up.
///
/// Serialises as a two-decimal string (`"25.00"`), or as the number `0` when
/// there are no leads at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRate(Option<u64>);

impl ConversionRate {
  pub fn of(converted: u64, total: u64) -> Self {
    if total == 0 {
      return Self(None);
    }
    let (converted, total) = (u128::from(converted), u128::from(total));
    let hundredths = (converted * 20_000 + total) / (2 * total);
    Self(Some(u64::try_from(hundredths).unwrap_or(u64::MAX)))
  }

  fn from_percent(p: f64) -> Self { Self(Some((p * 100.0).round().max(0.0) as u64)) }

  pub fn percent(&self) -> f64 { self.0.map_or(0.0, |h| h as f64 / 100.0) }
}

impl fmt::Display for ConversionRate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0 {
      Some(h) => write!(f, "{}.{:02}", h / 100, h % 100),
      None => f.write_str("0"),
    }
  }
}

impl Serialize for ConversionRate {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self.0 {
      Some(_) => serializer.collect_str(self),
      None => serializer.serialize_u8(0),
    }
  }
}

impl<'de> Deserialize<'de> for ConversionRate {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Text(String),
      Number(f64),
    }

    match Raw::deserialize(deserializer)? {
      Raw::Text(s) => s
        .parse::<f64>()
        .map(Self::from_percent)
        .map_err(serde::de::Error::custom),
      Raw::Number(n) if n == 0.0 => Ok(Self(None)),
      Raw::Number(n) => Ok(Self::from_percent(n)),
    }
  }
}

/// Response body of the analytics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadMetrics {
  pub total_leads:          u64,
  pub converted_leads:      u64,
  pub conversion_rate:      ConversionRate,
  /// Only statuses with at least one lead in scope appear.
  pub leads_by_status:      BTreeMap<LeadStatus, u64>,
  pub total_pipeline_value: f64,
  /// Always scoped to the current calendar month, regardless of the range.
  pub leads_this_month:     u64,
}

impl LeadMetrics {
  pub fn from_counts(
    total_leads: u64,
    converted_leads: u64,
    leads_by_status: BTreeMap<LeadStatus, u64>,
    total_pipeline_value: f64,
    leads_this_month: u64,
  ) -> Self {
    Self {
      total_leads,
      converted_leads,
      conversion_rate: ConversionRate::of(converted_leads, total_leads),
      leads_by_status,
      total_pipeline_value,
      leads_this_month,
    }
  }
}

/// Midnight UTC on the first day of `now`'s month.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
  NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|dt| dt.and_utc())
    .unwrap_or(now)
}
