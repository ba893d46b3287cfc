//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so lexical order equals chronological order. Tags
//! are stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings. Enumerations are stored by their wire names.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use leadbook_core::lead::{Lead, LeadSource, LeadStatus};
use uuid::Uuid;

use crate::{Error, Result};

/// Column list shared by every `SELECT` that decodes into [`LeadRow`].
pub const LEAD_COLUMNS: &str = "id, first_name, last_name, email, phone, company, job_title, \
   lead_source, lead_status, assigned_to, estimated_value, notes, tags, \
   last_contact_date, created_at, updated_at";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Truncate a record's timestamps to the microseconds [`encode_dt`] keeps.
pub fn at_stored_precision(mut lead: Lead) -> Lead {
  lead.created_at = lead.created_at.trunc_subsecs(6);
  lead.updated_at = lead.updated_at.trunc_subsecs(6);
  lead.last_contact_date = lead.last_contact_date.map(|dt| dt.trunc_subsecs(6));
  lead
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Tags ─────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[String]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row type ─────────────────────────────────────────────────────────────────

/// Column values of one `leads` row, in [`LEAD_COLUMNS`] order.
pub struct LeadRow {
  pub id:                String,
  pub first_name:        String,
  pub last_name:         String,
  pub email:             String,
  pub phone:             Option<String>,
  pub company:           Option<String>,
  pub job_title:         Option<String>,
  pub lead_source:       String,
  pub lead_status:       String,
  pub assigned_to:       Option<String>,
  pub estimated_value:   f64,
  pub notes:             Option<String>,
  pub tags:              String,
  pub last_contact_date: Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl LeadRow {
  pub fn from_lead(lead: &Lead) -> Result<Self> {
    Ok(Self {
      id:                encode_uuid(lead.id),
      first_name:        lead.first_name.clone(),
      last_name:         lead.last_name.clone(),
      email:             lead.email.clone(),
      phone:             lead.phone.clone(),
      company:           lead.company.clone(),
      job_title:         lead.job_title.clone(),
      lead_source:       lead.lead_source.as_str().to_owned(),
      lead_status:       lead.lead_status.as_str().to_owned(),
      assigned_to:       lead.assigned_to.clone(),
      estimated_value:   lead.estimated_value,
      notes:             lead.notes.clone(),
      tags:              encode_tags(&lead.tags)?,
      last_contact_date: lead.last_contact_date.map(encode_dt),
      created_at:        encode_dt(lead.created_at),
      updated_at:        encode_dt(lead.updated_at),
    })
  }

  /// Read a row selected with [`LEAD_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      first_name:        row.get(1)?,
      last_name:         row.get(2)?,
      email:             row.get(3)?,
      phone:             row.get(4)?,
      company:           row.get(5)?,
      job_title:         row.get(6)?,
      lead_source:       row.get(7)?,
      lead_status:       row.get(8)?,
      assigned_to:       row.get(9)?,
      estimated_value:   row.get(10)?,
      notes:             row.get(11)?,
      tags:              row.get(12)?,
      last_contact_date: row.get(13)?,
      created_at:        row.get(14)?,
      updated_at:        row.get(15)?,
    })
  }

  /// Bind this row to an `INSERT` with sixteen positional parameters.
  pub fn insert(&self, stmt: &mut rusqlite::Statement<'_>) -> rusqlite::Result<usize> {
    stmt.execute(rusqlite::params![
      self.id,
      self.first_name,
      self.last_name,
      self.email,
      self.phone,
      self.company,
      self.job_title,
      self.lead_source,
      self.lead_status,
      self.assigned_to,
      self.estimated_value,
      self.notes,
      self.tags,
      self.last_contact_date,
      self.created_at,
      self.updated_at,
    ])
  }

  pub fn into_lead(self) -> Result<Lead> {
    Ok(Lead {
      id:                decode_uuid(&self.id)?,
      first_name:        self.first_name,
      last_name:         self.last_name,
      email:             self.email,
      phone:             self.phone,
      company:           self.company,
      job_title:         self.job_title,
      lead_source:       LeadSource::parse(&self.lead_source)?,
      lead_status:       LeadStatus::parse(&self.lead_status)?,
      assigned_to:       self.assigned_to,
      estimated_value:   self.estimated_value,
      notes:             self.notes,
      tags:              decode_tags(&self.tags)?,
      last_contact_date: self.last_contact_date.as_deref().map(decode_dt).transpose()?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_ordered() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let b = a + chrono::Duration::nanoseconds(1_500);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2024-01-01T00:00:00.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&ea).unwrap(), a);
  }
}
