//! Validation error types for `gatehouse-core`.

use thiserror::Error;

/// A normalization or input-validation failure. Terminal; never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("unsupported provider: {0:?}")]
  UnsupportedProvider(String),

  #[error("assertion is missing a subject id")]
  MissingSubjectId,

  #[error("{field} exceeds {max} characters")]
  FieldTooLong { field: &'static str, max: usize },

  #[error("malformed email address")]
  InvalidEmail,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
