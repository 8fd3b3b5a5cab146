//! Health check endpoints.

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::models::Locker;
use crate::supabase::{Query, Record};
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Reads a single locker id to verify the backend is reachable.
/// Returns 503 Service Unavailable if it is not.
pub async fn ready(State(state): State<AppState>) -> StatusCode {
    let probe = Query::all().columns("id").limit(1);
    match state.backend().select(Locker::TABLE, &probe).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, backend = state.backend().backend_tag(), "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
