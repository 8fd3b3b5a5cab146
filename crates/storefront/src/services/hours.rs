//! Opening hours.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use serde::Serialize;
use thiserror::Error;

/// The gym opens at this local hour and closes at midnight.
pub const OPENING_HOUR: u32 = 11;

#[derive(Debug, Error)]
#[error("UTC offset out of range: {0} hours")]
pub struct InvalidOffset(pub i32);

/// Open/closed status with the texts shown to members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GymStatus {
    pub open: bool,
    pub headline: &'static str,
    pub detail: &'static str,
}

/// The gym's local clock.
#[derive(Debug, Clone, Copy)]
pub struct GymHours {
    offset: FixedOffset,
}

impl GymHours {
    /// Hours for a gym `utc_offset_hours` ahead of UTC.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOffset` if the offset is not within a day.
    pub fn new(utc_offset_hours: i32) -> Result<Self, InvalidOffset> {
        utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or(InvalidOffset(utc_offset_hours))
    }

    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        now.with_timezone(&self.offset).hour() >= OPENING_HOUR
    }

    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> GymStatus {
        if self.is_open(now) {
            GymStatus {
                open: true,
                headline: "الصالة مفتوحة",
                detail: "مفتوحة حتى 12:00 صباحاً",
            }
        } else {
            GymStatus {
                open: false,
                headline: "الصالة مغلقة",
                detail: "تفتح الساعة 11:00 صباحاً",
            }
        }
    }

    /// The gym's calendar date at `now`.
    #[must_use]
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }
}
