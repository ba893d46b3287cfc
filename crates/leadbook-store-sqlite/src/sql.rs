//! Translation of [`LeadFilter`] and [`SortSpec`] into SQL fragments.
//!
//! Fragments use anonymous `?` placeholders; the accompanying parameter list
//! is in placeholder order and owned, so it can be moved into a
//! `tokio_rusqlite` closure.

use leadbook_core::query::{LeadFilter, SortField, SortOrder, SortSpec};
use rusqlite::{Connection, functions::FunctionFlags, types::Value};

use crate::encode::encode_dt;

/// Unicode lower-casing; SQLite's built-in `lower` only folds ASCII.
pub const FOLD_CASE: &str = "fold_case";

/// Register the scalar functions the generated SQL relies on. Must run on
/// every new connection.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_CASE,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

/// A `WHERE` clause (possibly empty) and its bound parameters.
#[derive(Debug, Default)]
pub struct WhereClause {
  pub sql:    String,
  pub params: Vec<Value>,
}

pub fn where_clause(filter: &LeadFilter) -> WhereClause {
  let mut conds: Vec<&'static str> = vec![];
  let mut params: Vec<Value> = vec![];

  if let Some(needle) = &filter.search {
    conds.push(
      "(instr(fold_case(first_name), ?) > 0 \
        OR instr(fold_case(last_name), ?) > 0 \
        OR instr(fold_case(email), ?) > 0 \
        OR instr(fold_case(company), ?) > 0)",
    );
    for _ in 0..4 {
      params.push(Value::Text(needle.clone()));
    }
  }
  if let Some(status) = filter.status {
    conds.push("lead_status = ?");
    params.push(Value::Text(status.as_str().to_owned()));
  }
  if let Some(source) = filter.source {
    conds.push("lead_source = ?");
    params.push(Value::Text(source.as_str().to_owned()));
  }
  if let Some(rep) = &filter.assigned_to {
    conds.push("assigned_to = ?");
    params.push(Value::Text(rep.clone()));
  }
  if let Some(start) = filter.created.start {
    conds.push("created_at >= ?");
    params.push(Value::Text(encode_dt(start)));
  }
  if let Some(end) = filter.created.end {
    conds.push("created_at <= ?");
    params.push(Value::Text(encode_dt(end)));
  }

  let sql = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  WhereClause { sql, params }
}

fn sort_column(field: SortField) -> &'static str {
  match field {
    SortField::CreatedAt => "created_at",
    SortField::UpdatedAt => "updated_at",
    SortField::FirstName => "first_name",
    SortField::LastName => "last_name",
    SortField::Email => "email",
    SortField::Company => "company",
    SortField::JobTitle => "job_title",
    SortField::LeadSource => "lead_source",
    SortField::LeadStatus => "lead_status",
    SortField::AssignedTo => "assigned_to",
    SortField::EstimatedValue => "estimated_value",
    SortField::LastContactDate => "last_contact_date",
  }
}

/// `ORDER BY` with `id` as a tie-breaker so pages never overlap.
pub fn order_clause(sort: SortSpec) -> String {
  let dir = match sort.order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  };
  format!("ORDER BY {} {dir}, id {dir}", sort_column(sort.field))
}
