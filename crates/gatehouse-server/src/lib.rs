//! HTTP layer for Gatehouse.
//!
//! Exposes an axum [`Router`] with the login and session endpoints, backed
//! by any [`AccountStore`] and [`TokenVerifier`].

pub mod auth;
pub mod error;
pub mod routes;
pub mod verifier;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use gatehouse_core::{store::AccountStore, verify::TokenVerifier};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Base URL of the external token-verification service.
  pub verifier_url: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, V> {
  pub store:    Arc<S>,
  pub verifier: Arc<V>,
}

impl<S, V> Clone for AppState<S, V> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      verifier: Arc::clone(&self.verifier),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the auth server.
pub fn router<S, V>(state: AppState<S, V>) -> Router
where
  S: AccountStore + 'static,
  V: TokenVerifier + 'static,
{
  Router::new()
    .route("/auth/login", post(routes::login::<S, V>))
    .route("/auth/me", get(routes::me))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
