//! Locker route handlers.
//!
//! The two-step flow mirrors what members see: fetch the prompt for a
//! locker, then confirm it. Confirmation re-checks the locker against the
//! backend, so a prompt that went stale in between ends in a 409.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use rocky_gym_core::LockerId;

use crate::error::{AppError, add_breadcrumb};
use crate::models::Locker;
use crate::services::{LockerBoard, ReservationRequest};
use crate::state::AppState;

/// The locker board split the way the booking screen shows it.
#[derive(Debug, Serialize)]
pub struct BoardView {
    pub lockers: Vec<Locker>,
    pub available: Vec<Locker>,
    pub taken: Vec<Locker>,
}

impl From<&LockerBoard> for BoardView {
    fn from(board: &LockerBoard) -> Self {
        Self {
            lockers: board.lockers().to_vec(),
            available: board.available().into_iter().cloned().collect(),
            taken: board.taken().into_iter().cloned().collect(),
        }
    }
}

/// Confirmation prompt for a reservable locker.
#[derive(Debug, Serialize)]
pub struct PromptView {
    pub locker_id: LockerId,
    pub number: String,
    pub prompt: String,
}

/// Result of a confirmed reservation.
#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub locker: Locker,
    pub board: BoardView,
}

/// GET /lockers
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<BoardView>, AppError> {
    let board = state.lockers().list_lockers().await?;
    Ok(Json(BoardView::from(&board)))
}

/// GET /lockers/{id}/reservation
///
/// Returns the prompt, 204 for lockers that are not reservable, or 409 if
/// the locker is waiting on staff.
#[instrument(skip(state))]
pub async fn reservation(
    State(state): State<AppState>,
    Path(id): Path<LockerId>,
) -> Result<Response, AppError> {
    let locker = state.lockers().get_locker(id).await?;
    let Some(request) = ReservationRequest::for_locker(&locker)? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let prompt = request.prompt();
    Ok(Json(PromptView {
        locker_id: request.locker_id,
        number: request.number,
        prompt,
    })
    .into_response())
}

/// POST /lockers/{id}/reserve
///
/// Returns 204 without writing anything for lockers that are not
/// reservable.
#[instrument(skip(state))]
pub async fn reserve(
    State(state): State<AppState>,
    Path(id): Path<LockerId>,
) -> Result<Response, AppError> {
    let locker = state.lockers().get_locker(id).await?;
    let Some(request) = ReservationRequest::for_locker(&locker)? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let id = request.locker_id.to_string();
    let reservation = state.lockers().confirm(request).await?;
    add_breadcrumb("lockers", "Confirmed reservation", Some(&[("locker_id", id.as_str())]));

    Ok(Json(ReservationView {
        board: BoardView::from(&reservation.board),
        locker: reservation.locker,
    })
    .into_response())
}
