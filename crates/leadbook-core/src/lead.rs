//! The lead record held by the store, plus its status and source enums.
//!
//! A lead is a sales prospect: contact details, a classification (source and
//! pipeline status) and an estimated deal value. Identity and timestamps are
//! assigned by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Classification ──────────────────────────────────────────────────────────

/// Pipeline stage of a lead.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum LeadStatus {
  #[default]
  New,
  Contacted,
  Qualified,
  Converted,
  Lost,
}

impl LeadStatus {
  /// Parse the wire name (`"Converted"`), rejecting anything else.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownStatus(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

/// Acquisition channel of a lead.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum LeadSource {
  Website,
  LinkedIn,
  Referral,
  #[serde(rename = "Cold Call")]
  #[strum(serialize = "Cold Call")]
  ColdCall,
  #[serde(rename = "Email Campaign")]
  #[strum(serialize = "Email Campaign")]
  EmailCampaign,
  #[serde(rename = "Trade Show")]
  #[strum(serialize = "Trade Show")]
  TradeShow,
  #[default]
  Other,
}

impl LeadSource {
  /// The channels a lead is actually acquired through; `Other` is the
  /// catch-all default and is excluded.
  pub const CHANNELS: [LeadSource; 6] = [
    LeadSource::Website,
    LeadSource::LinkedIn,
    LeadSource::Referral,
    LeadSource::ColdCall,
    LeadSource::EmailCampaign,
    LeadSource::TradeShow,
  ];

  /// Parse the wire name (`"Cold Call"`), rejecting anything else.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSource(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
  #[serde(rename = "_id", alias = "id")]
  pub id:                Uuid,
  pub first_name:        String,
  pub last_name:         String,
  /// Always trimmed and lower-cased; unique across the store.
  pub email:             String,
  pub phone:             Option<String>,
  pub company:           Option<String>,
  pub job_title:         Option<String>,
  pub lead_source:       LeadSource,
  pub lead_status:       LeadStatus,
  /// Owning sales representative (free text).
  pub assigned_to:       Option<String>,
  pub estimated_value:   f64,
  pub notes:             Option<String>,
  #[serde(default)]
  pub tags:              Vec<String>,
  pub last_contact_date: Option<DateTime<Utc>>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl Lead {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Input for creating a lead.
///
/// `created_at` is normally left empty so the store stamps the record; the
/// seed utility supplies it to back-date synthetic data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
  pub first_name:        String,
  pub last_name:         String,
  pub email:             String,
  pub phone:             Option<String>,
  pub company:           Option<String>,
  pub job_title:         Option<String>,
  #[serde(default)]
  pub lead_source:       LeadSource,
  #[serde(default)]
  pub lead_status:       LeadStatus,
  pub assigned_to:       Option<String>,
  #[serde(default)]
  pub estimated_value:   f64,
  pub notes:             Option<String>,
  #[serde(default)]
  pub tags:              Vec<String>,
  pub last_contact_date: Option<DateTime<Utc>>,
  pub created_at:        Option<DateTime<Utc>>,
}

impl NewLead {
  /// Trim and lower-case fields the way the store expects, then check the
  /// required fields are present.
  pub fn normalize(mut self) -> Result<Self> {
    self.first_name = self.first_name.trim().to_owned();
    self.last_name = self.last_name.trim().to_owned();
    self.email = self.email.trim().to_lowercase();
    self.phone = trimmed(self.phone);
    self.company = trimmed(self.company);
    self.job_title = trimmed(self.job_title);
    self.assigned_to = trimmed(self.assigned_to);

    if self.first_name.is_empty() {
      return Err(Error::Validation("firstName is required".into()));
    }
    if self.last_name.is_empty() {
      return Err(Error::Validation("lastName is required".into()));
    }
    if self.email.is_empty() {
      return Err(Error::Validation("email is required".into()));
    }
    if !self.estimated_value.is_finite() || self.estimated_value < 0.0 {
      return Err(Error::Validation(
        "estimatedValue must be a non-negative number".into(),
      ));
    }
    Ok(self)
  }

  /// Build the persisted record. `now` is used for both timestamps unless
  /// `created_at` was supplied, in which case `updated_at` mirrors it.
  pub fn into_lead(self, id: Uuid, now: DateTime<Utc>) -> Lead {
    let created_at = self.created_at.unwrap_or(now);
    Lead {
      id,
      first_name: self.first_name,
      last_name: self.last_name,
      email: self.email,
      phone: self.phone,
      company: self.company,
      job_title: self.job_title,
      lead_source: self.lead_source,
      lead_status: self.lead_status,
      assigned_to: self.assigned_to,
      estimated_value: self.estimated_value,
      notes: self.notes,
      tags: self.tags,
      last_contact_date: self.last_contact_date,
      created_at,
      updated_at: created_at,
    }
  }
}

fn trimmed(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> NewLead {
    NewLead {
      first_name: "  Ada ".into(),
      last_name: "Lovelace".into(),
      email: "  Ada@Example.COM ".into(),
      company: Some("   ".into()),
      ..NewLead::default()
    }
  }

  #[test]
  fn normalize_trims_and_lowercases_email() {
    let lead = sample().normalize().unwrap();
    assert_eq!(lead.first_name, "Ada");
    assert_eq!(lead.email, "ada@example.com");
    assert_eq!(lead.company, None);
  }

  #[test]
  fn normalize_rejects_missing_email() {
    let mut input = sample();
    input.email = "   ".into();
    assert!(matches!(input.normalize(), Err(Error::Validation(_))));
  }

  #[test]
  fn normalize_rejects_negative_value() {
    let mut input = sample();
    input.estimated_value = -1.0;
    assert!(input.normalize().is_err());
  }

  #[test]
  fn defaults_are_new_and_other() {
    let input: NewLead = serde_json::from_str(
      r#"{"firstName":"A","lastName":"B","email":"a@b.c"}"#,
    )
    .unwrap();
    assert_eq!(input.lead_status, LeadStatus::New);
    assert_eq!(input.lead_source, LeadSource::Other);
    assert_eq!(input.estimated_value, 0.0);
  }

  #[test]
  fn enum_wire_names() {
    assert_eq!(LeadSource::ColdCall.as_str(), "Cold Call");
    assert_eq!(LeadSource::parse("Trade Show").unwrap(), LeadSource::TradeShow);
    assert_eq!(
      serde_json::to_string(&LeadSource::EmailCampaign).unwrap(),
      "\"Email Campaign\""
    );
    assert_eq!(LeadStatus::parse("Converted").unwrap(), LeadStatus::Converted);
    assert!(matches!(
      LeadStatus::parse("converted"),
      Err(Error::UnknownStatus(_))
    ));
  }

  #[test]
  fn into_lead_mirrors_supplied_creation_time() {
    let created = DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    let mut input = sample().normalize().unwrap();
    input.created_at = Some(created);
    let lead = input.into_lead(Uuid::new_v4(), Utc::now());
    assert_eq!(lead.created_at, created);
    assert_eq!(lead.updated_at, created);
  }

  #[test]
  fn lead_serialises_id_as_underscore_id() {
    let lead = sample()
      .normalize()
      .unwrap()
      .into_lead(Uuid::nil(), Utc::now());
    let json = serde_json::to_value(&lead).unwrap();
    assert!(json.get("_id").is_some());
    assert_eq!(json["firstName"], "Ada");
    assert_eq!(json["leadStatus"], "New");
  }
}
