//! Hosted backend client (auth, tables, object storage).
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local persistence, direct calls
//! - Everything goes through the [`Backend`] trait so handlers and services
//!   receive an injected `Arc<dyn Backend>` rather than a global client
//! - [`SupabaseClient`] talks HTTP to a Supabase project (`PostgREST`,
//!   `GoTrue`, Storage)
//! - [`InMemoryBackend`] keeps everything in process, for tests and local
//!   development
//!
//! # Example
//!
//! ```rust,ignore
//! use rocky_gym_storefront::supabase::{Filter, Query, Table};
//!
//! let lockers: Vec<Locker> = Table::<Locker>::new(backend.as_ref())
//!     .fetch(&Query::all().order_by("id", Order::Ascending))
//!     .await?;
//!
//! // Conditional update: only applies while the row is still available
//! let updated = Table::<Locker>::new(backend.as_ref())
//!     .update(
//!         &Filter::eq("id", 7).and_eq("status", "available"),
//!         &json!({ "available": false, "status": "pending" }),
//!     )
//!     .await?;
//! ```

mod client;
mod memory;
mod query;
mod table;
pub mod types;

pub use client::SupabaseClient;
pub use memory::{InMemoryBackend, TableOp};
pub use query::{Filter, Order, Query};
pub use table::{Record, Table};
pub use types::{AuthSession, AuthUser};

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use thiserror::Error;

use crate::config::BackendConfig;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with a non-success status.
    #[error("backend rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the backend.
        message: String,
    },

    /// The access token or API key was not accepted.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A configured URL could not be built.
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// HTTP status reported by the backend, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            _ => None,
        }
    }
}

/// Operations offered by the hosted backend.
///
/// Table rows travel as JSON objects; use [`Table`] for typed access.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name for logs (`"supabase"`, `"memory"`).
    fn backend_tag(&self) -> &'static str;

    /// Select rows matching `query`.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// Insert one row and return it as stored (with its assigned id).
    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError>;

    /// Apply `patch` to every row matching `filter`, returning the rows that
    /// were changed. An empty result means nothing matched.
    async fn update(
        &self,
        table: &str,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, BackendError>;

    /// Delete rows matching `filter`, returning how many were removed.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64, BackendError>;

    /// Register a new account.
    async fn sign_up(&self, email: &str, password: &SecretString)
    -> Result<AuthUser, BackendError>;

    /// Exchange email and password for a session.
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError>;

    /// Resolve the user behind an access token.
    async fn user_for_token(&self, access_token: &str) -> Result<AuthUser, BackendError>;

    /// Store `bytes` at `path` inside `bucket`, returning the stored path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError>;

    /// Public URL for an object.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove objects from `bucket`.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError>;
}

/// Build the backend selected by configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn connect(config: &BackendConfig) -> Result<Arc<dyn Backend>, BackendError> {
    match config {
        BackendConfig::Supabase(supabase) => Ok(Arc::new(SupabaseClient::new(supabase)?)),
        BackendConfig::Memory => Ok(Arc::new(InMemoryBackend::demo())),
    }
}
