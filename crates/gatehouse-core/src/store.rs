//! The `AccountStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `gatehouse-store-sqlite`). The reconciliation engine and the server
//! depend on this abstraction, not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, LoginPatch, NewAccount},
  provider::Provider,
  session::{NewSession, Session},
};

/// Result of an attempted account creation.
///
/// `Conflict` means a uniqueness constraint fired because a concurrent
/// request created the account first. The caller re-runs the lookup path
/// instead of surfacing an error.
#[derive(Debug)]
pub enum CreateOutcome {
  Created(Account),
  Conflict,
}

/// Abstraction over a Gatehouse account store backend.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Lookups ───────────────────────────────────────────────────────────

  /// Find the account owning `email`. Email is the primary merge key.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Find the account linked to `(provider, subject_id)` — the fallback
  /// merge key when an assertion carries no email.
  fn find_by_identity<'a>(
    &'a self,
    provider: Provider,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Retrieve an account by its surrogate key. Returns `None` if not found.
  fn get_account(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create an account and link its first external identity in one
  /// transaction. Reports [`CreateOutcome::Conflict`] instead of an error
  /// when a uniqueness constraint is violated.
  fn create_account(
    &self,
    new: NewAccount,
  ) -> impl Future<Output = Result<CreateOutcome, Self::Error>> + Send + '_;

  /// Write the merged field values for a repeat login and return the
  /// refreshed account.
  fn apply_login(
    &self,
    account_id: Uuid,
    patch: LoginPatch,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Idempotently associate `(provider, subject_id)` with an account.
  fn link_identity<'a>(
    &'a self,
    account_id: Uuid,
    provider: Provider,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a new session. Existing sessions are untouched.
  fn insert_session(
    &self,
    session: NewSession,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Resolve a session credential (by its stored hash) to its account.
  fn find_account_by_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;
}
