//! Command implementations.
//!
//! Every command builds the same [`AppState`] the storefront uses, so the
//! CLI reads and writes through the same services and rules.

pub mod catalog;
pub mod gym;
pub mod lockers;

use thiserror::Error;

use rocky_gym_storefront::config::{ConfigError, StorefrontConfig};
use rocky_gym_storefront::services::{CatalogError, LockerError};
use rocky_gym_storefront::state::{AppState, StateError};
use rocky_gym_storefront::supabase::BackendError;

/// Errors from CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("startup error: {0}")]
    State(#[from] StateError),

    #[error(transparent)]
    Locker(#[from] LockerError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to read confirmation: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Load configuration from the environment and connect to the backend.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid.
pub fn load_state() -> Result<AppState, CommandError> {
    let config = StorefrontConfig::from_env()?;
    tracing::debug!(backend = ?config.backend, "Loaded configuration");
    Ok(AppState::new(config)?)
}
