//! Core types and trait definitions for the Gatehouse identity service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod account;
pub mod assertion;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod verify;

pub use error::{Error, Result};
