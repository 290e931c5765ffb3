//! Session credentials — opaque bearer tokens bound to an account.
//!
//! The plaintext credential is returned to the caller exactly once; only
//! its SHA-256 digest is stored. Issuing a session never invalidates the
//! account's other sessions.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::{
  account::{Account, AccountProjection},
  store::AccountStore,
};

/// A freshly minted plaintext credential. Shown once, never stored.
#[derive(Debug, Clone)]
pub struct SessionCredential(pub String);

/// Input for [`AccountStore::insert_session`]. The store assigns
/// `session_id`.
#[derive(Debug, Clone)]
pub struct NewSession {
  pub account_id: Uuid,
  pub token_hash: String,
  pub issued_at:  DateTime<Utc>,
}

/// A persisted session row.
#[derive(Debug, Clone)]
pub struct Session {
  pub session_id: Uuid,
  pub account_id: Uuid,
  pub token_hash: String,
  pub issued_at:  DateTime<Utc>,
}

/// 32 bytes from the OS RNG, base64url without padding.
///
/// Also used for the placeholder `credential_secret` at account creation.
pub fn generate_secret() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  B64.encode(bytes)
}

/// Hex SHA-256 digest of a plaintext credential — the stored form.
pub fn token_hash(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Mint a new session for `account` and return the plaintext credential
/// plus the public projection.
pub async fn issue<S: AccountStore>(
  store: &S,
  account: &Account,
) -> Result<(SessionCredential, AccountProjection), S::Error> {
  let token = generate_secret();
  store
    .insert_session(NewSession {
      account_id: account.account_id,
      token_hash: token_hash(&token),
      issued_at:  Utc::now(),
    })
    .await?;
  Ok((SessionCredential(token), AccountProjection::from(account)))
}
