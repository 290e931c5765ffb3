//! Error type for `gatehouse-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown provider in storage: {0:?}")]
  UnknownProvider(String),

  #[error("unknown account status in storage: {0:?}")]
  UnknownStatus(String),

  /// Attempted to apply a login patch to an account that does not exist.
  #[error("account not found: {0}")]
  AccountNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
