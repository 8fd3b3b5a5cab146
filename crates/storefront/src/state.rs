//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{CatalogService, GymHours, InvalidOffset, LockerCoordinator};
use crate::supabase::{self, Backend, BackendError};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend setup failed: {0}")]
    Backend(#[from] BackendError),
    #[error("invalid gym hours: {0}")]
    Hours(#[from] InvalidOffset),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend handle, the long-lived services and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: Arc<dyn Backend>,
    lockers: LockerCoordinator,
    catalog: CatalogService,
    hours: GymHours,
}

impl AppState {
    /// Create application state, connecting to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built or the UTC
    /// offset is out of range.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let backend = supabase::connect(&config.backend)?;
        Self::with_backend(config, backend)
    }

    /// Create application state around an existing backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the UTC offset is out of range.
    pub fn with_backend(
        config: StorefrontConfig,
        backend: Arc<dyn Backend>,
    ) -> Result<Self, StateError> {
        let hours = GymHours::new(config.utc_offset_hours)?;
        let lockers = LockerCoordinator::new(Arc::clone(&backend));
        let catalog = CatalogService::new(Arc::clone(&backend), config.contact_url.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                lockers,
                catalog,
                hours,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend.
    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    #[must_use]
    pub fn lockers(&self) -> &LockerCoordinator {
        &self.inner.lockers
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    #[must_use]
    pub fn hours(&self) -> &GymHours {
        &self.inner.hours
    }
}
