//! Bearer-token helpers and the session extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use gatehouse_core::{
  account::Account, session, store::AccountStore, verify::TokenVerifier,
};

use crate::{AppState, error::Error};

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .filter(|t| !t.is_empty())
}

/// Extractor: the account bound to the request's session credential.
pub struct CurrentAccount(pub Account);

impl<S, V> FromRequestParts<AppState<S, V>> for CurrentAccount
where
  S: AccountStore + 'static,
  V: TokenVerifier + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, V>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(Error::Unauthorized)?;
    let account = state
      .store
      .find_account_by_session(&session::token_hash(token))
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .ok_or(Error::Unauthorized)?;
    Ok(CurrentAccount(account))
  }
}
