//! The reconciliation engine — maps an identity assertion to exactly one
//! account, creating it on first sight and merging on every later login.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
  account::{Account, LoginPatch, NewAccount},
  assertion::IdentityAssertion,
  session,
  store::{AccountStore, CreateOutcome},
};

#[derive(Debug, Error)]
pub enum ReconcileError<E> {
  #[error(transparent)]
  Store(#[from] E),

  /// Creation lost a race, but the follow-up lookup found no owner either.
  /// Only a genuinely inconsistent store reaches this.
  #[error("account creation conflicted and re-lookup found no account")]
  UnresolvedConflict,
}

/// Find or create the account owning `assertion`, applying the merge
/// policy on the update path.
///
/// Lookup order: email first (the primary merge key — this is what folds
/// logins from different providers into one account), then the
/// `(provider, subject_id)` identity set, then create. A create that loses
/// a race with a concurrent first login falls back to the lookup path and
/// becomes a normal update.
pub async fn reconcile<S: AccountStore>(
  store: &S,
  assertion: &IdentityAssertion,
) -> Result<Account, ReconcileError<S::Error>> {
  let now = Utc::now();

  if let Some(account) = lookup(store, assertion).await? {
    return Ok(update(store, account, assertion, now).await?);
  }

  let new = NewAccount {
    name:              assertion.name_or_placeholder(),
    email:             assertion.email.clone(),
    avatar_url:        assertion.avatar_url.clone(),
    provider:          assertion.provider,
    subject_id:        assertion.subject_id.clone(),
    credential_secret: session::generate_secret(),
    email_verified_at: assertion.email_verified.then_some(now),
    last_login_at:     now,
  };

  match store.create_account(new).await? {
    CreateOutcome::Created(account) => Ok(account),
    CreateOutcome::Conflict => {
      // The concurrent winner's account now owns this identity.
      match lookup(store, assertion).await? {
        Some(account) => Ok(update(store, account, assertion, now).await?),
        None => Err(ReconcileError::UnresolvedConflict),
      }
    }
  }
}

async fn lookup<S: AccountStore>(
  store: &S,
  assertion: &IdentityAssertion,
) -> Result<Option<Account>, S::Error> {
  if let Some(email) = assertion.email.as_deref()
    && let Some(account) = store.find_by_email(email).await?
  {
    return Ok(Some(account));
  }
  store
    .find_by_identity(assertion.provider, &assertion.subject_id)
    .await
}

async fn update<S: AccountStore>(
  store: &S,
  account: Account,
  assertion: &IdentityAssertion,
  now: DateTime<Utc>,
) -> Result<Account, S::Error> {
  let patch = merge_login(&account, assertion, now);
  let account = store.apply_login(account.account_id, patch).await?;
  store
    .link_identity(account.account_id, assertion.provider, &assertion.subject_id)
    .await?;
  Ok(account)
}

/// The field-level merge policy for a repeat login.
///
/// Fill-if-empty for `name`, `email`, `avatar_url` and `email_verified_at`;
/// last-login-wins for `provider` and `last_login_at`. Nothing is ever
/// blanked once set.
pub fn merge_login(
  existing: &Account,
  assertion: &IdentityAssertion,
  now: DateTime<Utc>,
) -> LoginPatch {
  LoginPatch {
    name: if existing.name.trim().is_empty() {
      assertion.name_or_placeholder()
    } else {
      existing.name.clone()
    },
    email: existing.email.clone().or_else(|| assertion.email.clone()),
    avatar_url: existing
      .avatar_url
      .clone()
      .or_else(|| assertion.avatar_url.clone()),
    provider: assertion.provider,
    email_verified_at: existing
      .email_verified_at
      .or(assertion.email_verified.then_some(now)),
    last_login_at: now,
  }
}
