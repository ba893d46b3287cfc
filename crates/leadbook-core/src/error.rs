//! Error types for `leadbook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),

  #[error("unknown lead status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown lead source: {0:?}")]
  UnknownSource(String),

  #[error("unknown sort field: {0:?}")]
  UnknownSortField(String),

  #[error("invalid date {0:?}: expected RFC 3339 or YYYY-MM-DD")]
  InvalidDate(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
