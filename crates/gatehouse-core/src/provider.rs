//! Provider — the enumerated tag for where a proof of identity came from.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// An identity provider the server accepts logins from.
///
/// Verified providers issue id tokens that pass through the external
/// token verifier; unverified providers supply only a claimed profile,
/// whose email is never trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
  Google,
  Facebook,
}

impl Provider {
  /// Whether proofs from this provider carry a verifiable token.
  pub fn is_verified(self) -> bool {
    match self {
      Provider::Google => true,
      Provider::Facebook => false,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Provider::Google => "google",
      Provider::Facebook => "facebook",
    }
  }
}

impl fmt::Display for Provider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Provider {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "google" => Ok(Provider::Google),
      "facebook" => Ok(Provider::Facebook),
      other => Err(Error::UnsupportedProvider(other.to_string())),
    }
  }
}
