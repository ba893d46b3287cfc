//! The store handed to the router: either an open SQLite store or an offline
//! stand-in used when the database could not be opened at startup.

use std::{path::Path, time::Duration};

use chrono::{DateTime, Utc};
use leadbook_core::{
  lead::{Lead, NewLead},
  metrics::LeadMetrics,
  query::{DateRange, Listing, QueryPlan},
  store::LeadStore,
};
use leadbook_store_sqlite::SqliteStore;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BackendError {
  #[error(transparent)]
  Store(#[from] leadbook_store_sqlite::Error),
  #[error("database unavailable: {0}")]
  Offline(String),
}

#[derive(Clone)]
pub enum Backend {
  Sqlite(SqliteStore),
  /// Every operation fails with the reason the store could not be opened.
  Offline(String),
}

impl Backend {
  /// Open the store at `path`, giving up after `timeout`. Failure is logged
  /// and yields [`Backend::Offline`]; no reconnection is attempted.
  pub async fn connect(path: &Path, timeout: Duration) -> Self {
    match tokio::time::timeout(timeout, SqliteStore::open(path)).await {
      Ok(Ok(store)) => {
        tracing::info!(path = %path.display(), "database opened");
        Backend::Sqlite(store)
      }
      Ok(Err(e)) => {
        tracing::error!(path = %path.display(), error = %e, "failed to open database; serving without it");
        Backend::Offline(e.to_string())
      }
      Err(_) => {
        tracing::error!(path = %path.display(), ?timeout, "timed out opening database; serving without it");
        Backend::Offline(format!("timed out after {timeout:?}"))
      }
    }
  }

  pub fn is_online(&self) -> bool { matches!(self, Backend::Sqlite(_)) }

  fn store(&self) -> Result<&SqliteStore, BackendError> {
    match self {
      Backend::Sqlite(store) => Ok(store),
      Backend::Offline(reason) => Err(BackendError::Offline(reason.clone())),
    }
  }
}

impl LeadStore for Backend {
  type Error = BackendError;

  async fn insert_lead(&self, input: NewLead) -> Result<Lead, BackendError> {
    Ok(self.store()?.insert_lead(input).await?)
  }

  async fn insert_many(&self, inputs: Vec<NewLead>) -> Result<usize, BackendError> {
    Ok(self.store()?.insert_many(inputs).await?)
  }

  async fn clear(&self) -> Result<u64, BackendError> { Ok(self.store()?.clear().await?) }

  async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>, BackendError> {
    Ok(self.store()?.get_lead(id).await?)
  }

  async fn list_leads(&self, plan: &QueryPlan) -> Result<Listing, BackendError> {
    Ok(self.store()?.list_leads(plan).await?)
  }

  async fn metrics(
    &self,
    range: DateRange,
    month_start: DateTime<Utc>,
  ) -> Result<LeadMetrics, BackendError> {
    Ok(self.store()?.metrics(range, month_start).await?)
  }
}
