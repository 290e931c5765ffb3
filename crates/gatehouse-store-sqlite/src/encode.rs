//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Providers and statuses are stored as
//! their lowercase wire names.

use chrono::{DateTime, Utc};
use gatehouse_core::{
  account::{Account, AccountStatus},
  provider::Provider,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Provider ─────────────────────────────────────────────────────────────────

pub fn encode_provider(p: Provider) -> &'static str { p.as_str() }

pub fn decode_provider(s: &str) -> Result<Provider> {
  s.parse().map_err(|_| Error::UnknownProvider(s.to_string()))
}

// ─── AccountStatus ────────────────────────────────────────────────────────────

pub fn encode_status(s: AccountStatus) -> &'static str {
  match s {
    AccountStatus::Active => "active",
    AccountStatus::Disabled => "disabled",
  }
}

pub fn decode_status(s: &str) -> Result<AccountStatus> {
  match s {
    "active" => Ok(AccountStatus::Active),
    "disabled" => Ok(AccountStatus::Disabled),
    other => Err(Error::UnknownStatus(other.to_string())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:        String,
  pub account_type_id:   i64,
  pub name:              String,
  pub email:             Option<String>,
  pub avatar_url:        Option<String>,
  pub provider:          String,
  pub status:            String,
  pub email_verified_at: Option<String>,
  pub last_login_at:     String,
  pub created_at:        String,
  pub credential_secret: String,
}

impl RawAccount {
  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:        decode_uuid(&self.account_id)?,
      account_type_id:   self.account_type_id,
      name:              self.name,
      email:             self.email,
      avatar_url:        self.avatar_url,
      provider:          decode_provider(&self.provider)?,
      status:            decode_status(&self.status)?,
      email_verified_at: self
        .email_verified_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      last_login_at:     decode_dt(&self.last_login_at)?,
      created_at:        decode_dt(&self.created_at)?,
      credential_secret: self.credential_secret,
    })
  }
}
