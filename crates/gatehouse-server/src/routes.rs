//! Handlers for the `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Provider-tagged proof → account + credential |
//! | `GET`  | `/auth/me` | Bearer session credential → projection |

use axum::{Json, extract::State, http::HeaderMap};
use gatehouse_core::{
  account::AccountProjection,
  assertion::{IdentityAssertion, RawProfile},
  provider::Provider,
  reconcile, session,
  store::AccountStore,
  verify::{TokenVerifier, VerifyError},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth, error::Error};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub provider: String,
  /// Required for unverified providers; ignored for verified ones.
  pub profile:  Option<RawProfile>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub account: AccountProjection,
  pub token:   String,
}

/// `POST /auth/login`
///
/// Verified providers send their id token as `Authorization: Bearer
/// <token>` and are checked against the external verifier; unverified
/// providers send a claimed profile in the body, taken on faith with
/// `email_verified` forced off.
pub async fn login<S, V>(
  State(state): State<AppState<S, V>>,
  headers: HeaderMap,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, Error>
where
  S: AccountStore + 'static,
  V: TokenVerifier + 'static,
{
  let provider: Provider = body
    .provider
    .parse()
    .map_err(|e: gatehouse_core::Error| Error::BadRequest(e.to_string()))?;

  let assertion = if provider.is_verified() {
    let token = auth::bearer_token(&headers)
      .ok_or_else(|| Error::BadRequest("missing bearer token".to_string()))?;
    let claims = state.verifier.verify(token).await.map_err(|e| match e {
      VerifyError::Rejected(reason) => {
        tracing::debug!(%provider, %reason, "id token rejected");
        Error::InvalidProof
      }
      VerifyError::Unavailable(reason) => {
        tracing::error!(%provider, %reason, "token verifier unreachable");
        Error::VerifierUnavailable
      }
    })?;
    IdentityAssertion::from_claims(provider, &claims).map_err(Error::Validation)?
  } else {
    let profile: &RawProfile = body
      .profile
      .as_ref()
      .ok_or_else(|| Error::BadRequest("missing profile".to_string()))?;
    IdentityAssertion::from_profile(provider, profile).map_err(Error::Validation)?
  };

  let account = reconcile::reconcile(state.store.as_ref(), &assertion)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let (credential, projection) = session::issue(state.store.as_ref(), &account)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  tracing::info!(account_id = %account.account_id, %provider, "login");

  Ok(Json(LoginResponse { account: projection, token: credential.0 }))
}

/// `GET /auth/me` — the projection for the session credential's account.
pub async fn me(
  auth::CurrentAccount(account): auth::CurrentAccount,
) -> Json<AccountProjection> {
  Json(AccountProjection::from(&account))
}
