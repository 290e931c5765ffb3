//! Account — the durable record an identity assertion reconciles into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provider::Provider;

/// `account_type_id` assigned to accounts created through an external
/// identity provider; distinguishes them from accounts created by other
/// paths outside this subsystem.
pub const EXTERNAL_ACCOUNT_TYPE_ID: i64 = 3;

/// Account lifecycle flag. [`Active`](AccountStatus::Active) at creation;
/// login never alters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
  Active,
  Disabled,
}

/// The durable account record.
///
/// `credential_secret` is an unguessable placeholder generated at creation
/// for accounts that have no password login path. It is deliberately not
/// `Serialize`; only [`AccountProjection`] crosses the wire.
#[derive(Debug, Clone)]
pub struct Account {
  pub account_id:        Uuid,
  pub account_type_id:   i64,
  pub name:              String,
  pub email:             Option<String>,
  pub avatar_url:        Option<String>,
  /// Provider of the most recent successful login. Last-login-wins, unlike
  /// the fill-if-empty fields.
  pub provider:          Provider,
  pub status:            AccountStatus,
  pub email_verified_at: Option<DateTime<Utc>>,
  pub last_login_at:     DateTime<Utc>,
  pub created_at:        DateTime<Utc>,
  pub credential_secret: String,
}

/// Input for [`AccountStore::create_account`](crate::store::AccountStore::create_account).
/// The store assigns `account_id`, `account_type_id`, `status` and
/// `created_at`, and links `(provider, subject_id)` in the same
/// transaction.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub name:              String,
  pub email:             Option<String>,
  pub avatar_url:        Option<String>,
  pub provider:          Provider,
  pub subject_id:        String,
  pub credential_secret: String,
  pub email_verified_at: Option<DateTime<Utc>>,
  pub last_login_at:     DateTime<Utc>,
}

/// The merged field values written on a repeat login. Produced by
/// [`merge_login`](crate::reconcile::merge_login); the store writes them
/// verbatim.
#[derive(Debug, Clone)]
pub struct LoginPatch {
  pub name:              String,
  pub email:             Option<String>,
  pub avatar_url:        Option<String>,
  pub provider:          Provider,
  pub email_verified_at: Option<DateTime<Utc>>,
  pub last_login_at:     DateTime<Utc>,
}

/// Public-safe view of an account — what login and `/auth/me` return.
#[derive(Debug, Clone, Serialize)]
pub struct AccountProjection {
  pub id:            Uuid,
  pub name:          String,
  pub email:         Option<String>,
  pub avatar_url:    Option<String>,
  pub provider:      Provider,
  pub status:        AccountStatus,
  pub last_login_at: DateTime<Utc>,
}

impl From<&Account> for AccountProjection {
  fn from(account: &Account) -> Self {
    Self {
      id:            account.account_id,
      name:          account.name.clone(),
      email:         account.email.clone(),
      avatar_url:    account.avatar_url.clone(),
      provider:      account.provider,
      status:        account.status,
      last_login_at: account.last_login_at,
    }
  }
}
