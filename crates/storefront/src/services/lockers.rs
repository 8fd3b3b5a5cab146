//! Locker reservations.
//!
//! Lockers move `available -> pending` when a member confirms a reservation.
//! Staff later move them to `booked` (or back to `available`) outside this
//! service; nothing here ever writes `booked`.
//!
//! The write is a compare-and-swap: the update only matches while the
//! stored status is still `available`, so two members racing for the same
//! locker cannot both win. A reservation that matches no row means someone
//! else got there first.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use rocky_gym_core::{LockerId, LockerStatus};

use crate::models::Locker;
use crate::supabase::{Backend, BackendError, Filter, Order, Query, Table};

/// Errors from locker operations.
#[derive(Debug, Error)]
pub enum LockerError {
    /// Backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Someone already holds this locker pending staff confirmation.
    #[error("locker {number} is already partially reserved by someone else, please contact the gym staff")]
    AwaitingStaff { number: String },

    /// The locker was reserved by someone else after it was displayed.
    #[error("locker {number} was just taken by someone else")]
    JustTaken { number: String },

    /// No locker with this id.
    #[error("locker {0} not found")]
    NotFound(LockerId),
}

/// Every locker, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockerBoard {
    lockers: Vec<Locker>,
}

impl LockerBoard {
    #[must_use]
    pub const fn new(lockers: Vec<Locker>) -> Self {
        Self { lockers }
    }

    #[must_use]
    pub fn lockers(&self) -> &[Locker] {
        &self.lockers
    }

    /// Lockers members can still reserve.
    #[must_use]
    pub fn available(&self) -> Vec<&Locker> {
        self.lockers.iter().filter(|l| l.available).collect()
    }

    /// Lockers that are pending or booked.
    #[must_use]
    pub fn taken(&self) -> Vec<&Locker> {
        self.lockers.iter().filter(|l| !l.available).collect()
    }

    #[must_use]
    pub fn get(&self, id: LockerId) -> Option<&Locker> {
        self.lockers.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lockers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lockers.is_empty()
    }
}

/// A pending confirmation prompt for one locker.
///
/// Obtained from [`ReservationRequest::for_locker`]; dropping it without
/// calling [`LockerCoordinator::confirm`] cancels the reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "a reservation request does nothing unless confirmed"]
pub struct ReservationRequest {
    pub locker_id: LockerId,
    pub number: String,
}

impl ReservationRequest {
    /// Check a locker as the member last saw it.
    ///
    /// Returns `Ok(None)` for lockers that are simply not reservable
    /// (booked, or flagged unavailable); those are ignored without an error.
    ///
    /// # Errors
    ///
    /// Returns `LockerError::AwaitingStaff` if the locker is pending.
    pub fn for_locker(locker: &Locker) -> Result<Option<Self>, LockerError> {
        if locker.status == LockerStatus::Pending {
            return Err(LockerError::AwaitingStaff {
                number: locker.number.clone(),
            });
        }
        if !locker.available {
            return Ok(None);
        }
        Ok(Some(Self {
            locker_id: locker.id,
            number: locker.number.clone(),
        }))
    }

    /// Confirmation question shown to the member.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("هل تريد فعلاً حجز الخزنة {}؟", self.number)
    }
}

/// A confirmed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    /// The locker as stored after the write.
    pub locker: Locker,
    /// The board re-read after the write.
    pub board: LockerBoard,
}

/// What happened to a reservation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The locker was not reservable; nothing was asked or written.
    Ignored,
    /// The member declined the prompt.
    Cancelled,
    Reserved(Reservation),
}

#[derive(Serialize)]
struct ReservePatch {
    available: bool,
    status: LockerStatus,
}

/// Shared view of the lockers plus the reservation workflow.
///
/// Cheap to clone; clones share the snapshot.
#[derive(Clone)]
pub struct LockerCoordinator {
    inner: Arc<LockerCoordinatorInner>,
}

struct LockerCoordinatorInner {
    backend: Arc<dyn Backend>,
    snapshot: RwLock<LockerBoard>,
}

impl LockerCoordinator {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            inner: Arc::new(LockerCoordinatorInner {
                backend,
                snapshot: RwLock::new(LockerBoard::default()),
            }),
        }
    }

    fn table(&self) -> Table<'_, Locker> {
        Table::new(self.inner.backend.as_ref())
    }

    /// Fetch every locker ordered by id and make it the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `LockerError::Backend` if the fetch fails; the previous
    /// snapshot is kept.
    #[instrument(skip(self))]
    pub async fn list_lockers(&self) -> Result<LockerBoard, LockerError> {
        let lockers = self
            .table()
            .fetch(&Query::all().order_by("id", Order::Ascending))
            .await?;

        let board = LockerBoard::new(lockers);
        *self.inner.snapshot.write().await = board.clone();
        Ok(board)
    }

    /// The last successfully fetched board (empty before the first fetch).
    pub async fn snapshot(&self) -> LockerBoard {
        self.inner.snapshot.read().await.clone()
    }

    /// Fetch one locker's current row.
    ///
    /// # Errors
    ///
    /// Returns `LockerError::NotFound` if no such locker exists.
    #[instrument(skip(self), fields(locker_id = %id))]
    pub async fn get_locker(&self, id: LockerId) -> Result<Locker, LockerError> {
        self.table()
            .fetch_one(Query::all().eq("id", id.as_i64()))
            .await?
            .ok_or(LockerError::NotFound(id))
    }

    /// Apply a confirmed reservation and re-read the board.
    ///
    /// # Errors
    ///
    /// Returns `LockerError::JustTaken` if the locker stopped being
    /// available since it was displayed, `LockerError::NotFound` if it no
    /// longer exists, or `LockerError::Backend` if the write fails. Nothing
    /// is retried.
    #[instrument(skip(self, request), fields(locker_id = %request.locker_id, number = %request.number))]
    pub async fn confirm(&self, request: ReservationRequest) -> Result<Reservation, LockerError> {
        let still_available = Filter::eq("id", request.locker_id.as_i64())
            .and_eq("status", LockerStatus::Available.as_str());
        let patch = ReservePatch {
            available: false,
            status: LockerStatus::Pending,
        };

        let Some(locker) = self
            .table()
            .update(&still_available, &patch)
            .await?
            .into_iter()
            .next()
        else {
            // Either someone else won, or the row is gone.
            self.get_locker(request.locker_id).await?;
            return Err(LockerError::JustTaken {
                number: request.number,
            });
        };

        info!("Locker reserved, awaiting staff confirmation");

        let board = match self.list_lockers().await {
            Ok(board) => board,
            Err(e) => {
                // The write landed; serve the last snapshot rather than fail it.
                warn!(error = %e, "Failed to refresh lockers after reservation");
                self.snapshot().await
            }
        };

        Ok(Reservation { locker, board })
    }

    /// Run the whole reservation flow for a locker as the member saw it.
    ///
    /// `confirm` is asked at most once, and only for reservable lockers.
    ///
    /// # Errors
    ///
    /// See [`ReservationRequest::for_locker`] and [`LockerCoordinator::confirm`].
    pub async fn reserve(
        &self,
        locker: &Locker,
        confirm: impl FnOnce(&ReservationRequest) -> bool + Send,
    ) -> Result<ReserveOutcome, LockerError> {
        let Some(request) = ReservationRequest::for_locker(locker)? else {
            return Ok(ReserveOutcome::Ignored);
        };
        if !confirm(&request) {
            return Ok(ReserveOutcome::Cancelled);
        }
        self.confirm(request).await.map(ReserveOutcome::Reserved)
    }
}
