//! The token-verification seam.
//!
//! The core never parses or cryptographically validates id tokens itself.
//! An opaque token goes to a [`TokenVerifier`] and a claim set comes back,
//! or a rejection. The HTTP implementation lives in `gatehouse-server`.

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;

/// Claims returned by the external verifier for a valid id token.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedClaims {
  #[serde(rename = "sub")]
  pub subject:        String,
  pub email:          Option<String>,
  pub name:           Option<String>,
  pub picture:        Option<String>,
  #[serde(default)]
  pub email_verified: bool,
}

#[derive(Debug, Error)]
pub enum VerifyError {
  /// The verifier examined the token and rejected it (expired, malformed,
  /// wrong audience). Terminal; not retried.
  #[error("token rejected: {0}")]
  Rejected(String),

  /// The verifier could not be reached or gave an unusable answer.
  #[error("verifier unavailable: {0}")]
  Unavailable(String),
}

/// External service that validates opaque id tokens.
pub trait TokenVerifier: Send + Sync {
  fn verify<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<VerifiedClaims, VerifyError>> + Send + 'a;
}
