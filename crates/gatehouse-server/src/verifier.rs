//! HTTP client for the external token-verification service.
//!
//! `POST {base_url}/v1/verify` with `{"token": "..."}`. A 2xx answer
//! carries the claim set; a 4xx answer means the token was examined and
//! rejected; transport failures and 5xx answers are reported as
//! unavailability.

use gatehouse_core::verify::{TokenVerifier, VerifiedClaims, VerifyError};
use serde_json::json;

#[derive(Clone)]
pub struct HttpVerifier {
  client:   reqwest::Client,
  base_url: String,
}

impl HttpVerifier {
  pub fn new(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    Self {
      client:   reqwest::Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }
}

impl TokenVerifier for HttpVerifier {
  async fn verify(&self, token: &str) -> Result<VerifiedClaims, VerifyError> {
    let url = format!("{}/v1/verify", self.base_url);
    let response = self
      .client
      .post(&url)
      .json(&json!({ "token": token }))
      .send()
      .await
      .map_err(|e| VerifyError::Unavailable(e.to_string()))?;

    let status = response.status();
    if status.is_client_error() {
      let reason = response.text().await.unwrap_or_default();
      return Err(VerifyError::Rejected(reason));
    }
    if !status.is_success() {
      return Err(VerifyError::Unavailable(format!(
        "verifier answered {status}"
      )));
    }

    response
      .json::<VerifiedClaims>()
      .await
      .map_err(|e| VerifyError::Unavailable(e.to_string()))
  }
}
