//! Gym open/closed status.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::services::GymStatus;
use crate::state::AppState;

/// GET /status
pub async fn show(State(state): State<AppState>) -> Json<GymStatus> {
    Json(state.hours().status(Utc::now()))
}
