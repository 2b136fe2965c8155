//! # latitude
//!
//! Blocking client for the Latitude.sh bare-metal REST API.
//!
//! This crate provides:
//! - JSON:API request and response envelopes
//! - Bearer-token authentication, with a placeholder when no token is set
//! - Status classification into not found, rejected and transport errors
//! - Bounded retry with exponential backoff for idempotent calls
//!
//! The [`Client`] implements [`reconcile::RemoteApi`], which is how the
//! reconciliation engine reaches the API.

pub mod client;
pub mod envelope;
pub mod error;
pub mod retry;

pub use client::{Client, DEFAULT_API_URL, PLACEHOLDER_TOKEN};
pub use error::{Error, ErrorCategory, Result};
pub use retry::RetryConfig;
