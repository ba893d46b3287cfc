//! The SQLite implementation of [`LeadStore`].

use std::{
  collections::{BTreeMap, HashSet},
  path::Path,
};

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, params_from_iter};
use uuid::Uuid;

use leadbook_core::{
  lead::{Lead, LeadStatus, NewLead},
  metrics::LeadMetrics,
  query::{DateRange, LeadFilter, Listing, QueryPlan},
  store::LeadStore,
};

use crate::{
  Error, Result,
  encode::{LEAD_COLUMNS, LeadRow, at_stored_precision, encode_uuid},
  schema::SCHEMA,
  sql::{WhereClause, order_clause, register_functions, where_clause},
};

const INSERT_LEAD: &str = "INSERT INTO leads (
     id, first_name, last_name, email, phone, company, job_title,
     lead_source, lead_status, assigned_to, estimated_value, notes, tags,
     last_contact_date, created_at, updated_at
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lead store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "lead store ready");
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Map a unique-index violation on insert to [`Error::DuplicateEmail`].
fn insert_error(err: tokio_rusqlite::Error, email: &str) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _)) = &err
    && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  {
    return Error::DuplicateEmail(email.to_owned());
  }
  Error::Database(err)
}

fn count(conn: &rusqlite::Connection, clause: &WhereClause) -> rusqlite::Result<u64> {
  let n: i64 = conn.query_row(
    &format!("SELECT COUNT(*) FROM leads {}", clause.sql),
    params_from_iter(clause.params.iter()),
    |r| r.get(0),
  )?;
  Ok(n.max(0) as u64)
}

// ─── LeadStore impl ──────────────────────────────────────────────────────────

impl LeadStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_lead(&self, input: NewLead) -> Result<Lead> {
    let lead = at_stored_precision(input.normalize()?.into_lead(Uuid::new_v4(), Utc::now()));
    let row = LeadRow::from_lead(&lead)?;

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(INSERT_LEAD)?;
        row.insert(&mut stmt)?;
        Ok(())
      })
      .await
      .map_err(|e| insert_error(e, &lead.email))?;

    Ok(lead)
  }

  async fn insert_many(&self, inputs: Vec<NewLead>) -> Result<usize> {
    let now = Utc::now();
    let mut seen = HashSet::with_capacity(inputs.len());
    let mut rows = Vec::with_capacity(inputs.len());
    for input in inputs {
      let lead = at_stored_precision(input.normalize()?.into_lead(Uuid::new_v4(), now));
      if !seen.insert(lead.email.clone()) {
        return Err(Error::DuplicateEmail(lead.email));
      }
      rows.push(LeadRow::from_lead(&lead)?);
    }

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(INSERT_LEAD)?;
          for row in &rows {
            written += row.insert(&mut stmt)?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    Ok(written)
  }

  async fn clear(&self) -> Result<u64> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM leads", [])?))
      .await?;
    Ok(removed as u64)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>> {
    let id_str = encode_uuid(id);

    let row: Option<LeadRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
              rusqlite::params![id_str],
              LeadRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    row.map(LeadRow::into_lead).transpose()
  }

  async fn list_leads(&self, plan: &QueryPlan) -> Result<Listing> {
    let WhereClause { sql: where_sql, params } = where_clause(&plan.filter);
    let order = order_clause(plan.sort);
    let limit = i64::from(plan.limit);
    let offset = i64::try_from(plan.offset).unwrap_or(i64::MAX);

    let (rows, total): (Vec<LeadRow>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM leads {where_sql}"),
          params_from_iter(params.iter()),
          |r| r.get(0),
        )?;

        let mut page_params = params;
        page_params.push(rusqlite::types::Value::Integer(limit));
        page_params.push(rusqlite::types::Value::Integer(offset));

        let mut stmt = conn.prepare(&format!(
          "SELECT {LEAD_COLUMNS} FROM leads {where_sql} {order} LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
          .query_map(params_from_iter(page_params.iter()), LeadRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    Ok(Listing {
      leads: rows.into_iter().map(LeadRow::into_lead).collect::<Result<_>>()?,
      total: total.max(0) as u64,
    })
  }

  async fn metrics(
    &self,
    range: DateRange,
    month_start: DateTime<Utc>,
  ) -> Result<LeadMetrics> {
    let scoped = where_clause(&LeadFilter::created_within(range));
    let converted_only = where_clause(
      &LeadFilter::created_within(range).with_status(LeadStatus::Converted),
    );
    let monthly = where_clause(&LeadFilter::created_within(DateRange::since(month_start)));

    let (total, converted, groups, pipeline, this_month) = self
      .conn
      .call(move |conn| {
        let total = count(conn, &scoped)?;
        let converted = count(conn, &converted_only)?;
        let this_month = count(conn, &monthly)?;

        let pipeline: f64 = conn.query_row(
          &format!(
            "SELECT COALESCE(SUM(estimated_value), 0.0) FROM leads {}",
            scoped.sql
          ),
          params_from_iter(scoped.params.iter()),
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT lead_status, COUNT(*) FROM leads {} GROUP BY lead_status",
          scoped.sql
        ))?;
        let groups = stmt
          .query_map(params_from_iter(scoped.params.iter()), |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, converted, groups, pipeline, this_month))
      })
      .await?;

    let mut by_status = BTreeMap::new();
    for (status, n) in groups {
      by_status.insert(LeadStatus::parse(&status)?, n.max(0) as u64);
    }

    Ok(LeadMetrics::from_counts(total, converted, by_status, pipeline, this_month))
  }
}
