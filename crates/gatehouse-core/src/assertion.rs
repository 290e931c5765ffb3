//! Identity assertions and the per-provider normalizers.
//!
//! An assertion is the uniform, validated shape both login paths reduce to
//! before reconciliation. Normalization is pure; token verification has
//! already happened upstream (see [`crate::verify`]).

use serde::Deserialize;

use crate::{Error, Result, provider::Provider, verify::VerifiedClaims};

pub const MAX_SUBJECT_ID_LEN: usize = 128;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_URL_LEN: usize = 2048;

/// A caller-supplied profile from a provider with no verifiable token.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProfile {
  pub subject_id: String,
  pub name:       Option<String>,
  pub email:      Option<String>,
  pub avatar_url: Option<String>,
}

/// A normalized, provider-tagged claim about who the caller is.
#[derive(Debug, Clone)]
pub struct IdentityAssertion {
  pub provider:       Provider,
  pub subject_id:     String,
  pub email:          Option<String>,
  pub display_name:   Option<String>,
  pub avatar_url:     Option<String>,
  /// Only a verified provider can set this. An unverified provider's email
  /// is recorded but never attested.
  pub email_verified: bool,
}

impl IdentityAssertion {
  /// Normalize a verifier-issued claim set.
  ///
  /// The claim set has already passed cryptographic verification; this only
  /// shapes and bounds it. A missing display name falls back to a
  /// placeholder derived from the subject id.
  pub fn from_claims(provider: Provider, claims: &VerifiedClaims) -> Result<Self> {
    let subject_id = require_subject_id(&claims.subject)?;
    let display_name = normalize_name(claims.name.as_deref())?
      .or_else(|| Some(placeholder_name(&subject_id)));
    Ok(Self {
      provider,
      email: normalize_email(claims.email.as_deref())?,
      display_name,
      avatar_url: normalize_url(claims.picture.as_deref())?,
      email_verified: claims.email_verified,
      subject_id,
    })
  }

  /// Normalize an unverified, caller-supplied profile.
  ///
  /// `email_verified` is forced off regardless of what the caller claims.
  pub fn from_profile(provider: Provider, profile: &RawProfile) -> Result<Self> {
    Ok(Self {
      provider,
      subject_id: require_subject_id(&profile.subject_id)?,
      email: normalize_email(profile.email.as_deref())?,
      display_name: normalize_name(profile.name.as_deref())?,
      avatar_url: normalize_url(profile.avatar_url.as_deref())?,
      email_verified: false,
    })
  }

  /// Display name to use when the assertion creates an account.
  pub fn name_or_placeholder(&self) -> String {
    self
      .display_name
      .clone()
      .unwrap_or_else(|| placeholder_name(&self.subject_id))
  }
}

/// `"User "` plus the first six characters of the subject id.
pub fn placeholder_name(subject_id: &str) -> String {
  format!("User {}", subject_id.chars().take(6).collect::<String>())
}

fn require_subject_id(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::MissingSubjectId);
  }
  if trimmed.len() > MAX_SUBJECT_ID_LEN {
    return Err(Error::FieldTooLong { field: "subject_id", max: MAX_SUBJECT_ID_LEN });
  }
  Ok(trimmed.to_string())
}

fn normalize_name(raw: Option<&str>) -> Result<Option<String>> {
  match raw.map(str::trim) {
    None | Some("") => Ok(None),
    Some(name) if name.len() > MAX_NAME_LEN => {
      Err(Error::FieldTooLong { field: "name", max: MAX_NAME_LEN })
    }
    Some(name) => Ok(Some(name.to_string())),
  }
}

fn normalize_email(raw: Option<&str>) -> Result<Option<String>> {
  let email = match raw.map(str::trim) {
    None | Some("") => return Ok(None),
    Some(e) => e,
  };
  if email.len() > MAX_EMAIL_LEN {
    return Err(Error::FieldTooLong { field: "email", max: MAX_EMAIL_LEN });
  }
  let Some((local, domain)) = email.split_once('@') else {
    return Err(Error::InvalidEmail);
  };
  if local.is_empty()
    || domain.is_empty()
    || domain.contains('@')
    || email.chars().any(char::is_whitespace)
  {
    return Err(Error::InvalidEmail);
  }
  Ok(Some(email.to_string()))
}

fn normalize_url(raw: Option<&str>) -> Result<Option<String>> {
  match raw.map(str::trim) {
    None | Some("") => Ok(None),
    Some(url) if url.len() > MAX_URL_LEN => {
      Err(Error::FieldTooLong { field: "avatar_url", max: MAX_URL_LEN })
    }
    Some(url) => Ok(Some(url.to_string())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn claims(subject: &str) -> VerifiedClaims {
    VerifiedClaims {
      subject:        subject.to_string(),
      email:          Some("alice@example.com".to_string()),
      name:           None,
      picture:        None,
      email_verified: true,
    }
  }

  fn profile(subject_id: &str) -> RawProfile {
    RawProfile {
      subject_id: subject_id.to_string(),
      name:       Some("Alice".to_string()),
      email:      Some("alice@example.com".to_string()),
      avatar_url: None,
    }
  }

  #[test]
  fn claims_without_name_get_placeholder() {
    let a = IdentityAssertion::from_claims(Provider::Google, &claims("abc123xyz")).unwrap();
    assert_eq!(a.display_name.as_deref(), Some("User abc123"));
    assert!(a.email_verified);
  }

  #[test]
  fn placeholder_handles_short_subject_ids() {
    assert_eq!(placeholder_name("ab"), "User ab");
  }

  #[test]
  fn empty_subject_id_fails() {
    assert_eq!(
      IdentityAssertion::from_claims(Provider::Google, &claims("  ")).unwrap_err(),
      Error::MissingSubjectId,
    );
    assert_eq!(
      IdentityAssertion::from_profile(Provider::Facebook, &profile("")).unwrap_err(),
      Error::MissingSubjectId,
    );
  }

  #[test]
  fn oversized_subject_id_fails() {
    let long = "x".repeat(MAX_SUBJECT_ID_LEN + 1);
    assert!(matches!(
      IdentityAssertion::from_profile(Provider::Facebook, &profile(&long)),
      Err(Error::FieldTooLong { field: "subject_id", .. })
    ));
  }

  #[test]
  fn profile_email_is_never_verified() {
    let a = IdentityAssertion::from_profile(Provider::Facebook, &profile("zzz999")).unwrap();
    assert!(!a.email_verified);
    assert_eq!(a.email.as_deref(), Some("alice@example.com"));
  }

  #[test]
  fn blank_email_normalizes_to_none() {
    let mut p = profile("zzz999");
    p.email = Some("   ".to_string());
    let a = IdentityAssertion::from_profile(Provider::Facebook, &p).unwrap();
    assert!(a.email.is_none());
  }

  #[test]
  fn malformed_emails_fail() {
    for bad in ["no-at-sign", "@nodomain", "nolocal@", "two@at@signs", "sp ace@x.com"] {
      let mut p = profile("zzz999");
      p.email = Some(bad.to_string());
      assert_eq!(
        IdentityAssertion::from_profile(Provider::Facebook, &p).unwrap_err(),
        Error::InvalidEmail,
        "expected rejection for {bad:?}",
      );
    }
  }

  #[test]
  fn oversized_name_fails() {
    let mut p = profile("zzz999");
    p.name = Some("x".repeat(MAX_NAME_LEN + 1));
    assert!(matches!(
      IdentityAssertion::from_profile(Provider::Facebook, &p),
      Err(Error::FieldTooLong { field: "name", .. })
    ));
  }
}
