//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Reservation status of a locker.
///
/// Only `Available -> Pending` is ever written by this system. Moving a
/// pending locker to `Booked` (or back to `Available`) is done by gym staff
/// directly in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockerStatus {
    #[default]
    Available,
    /// Requested by a member, waiting for staff confirmation.
    Pending,
    /// Confirmed by staff.
    Booked,
}

impl LockerStatus {
    /// The value stored in the `status` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Booked => "booked",
        }
    }
}

impl std::fmt::Display for LockerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LockerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "booked" => Ok(Self::Booked),
            _ => Err(format!("invalid locker status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_locker_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&LockerStatus::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: LockerStatus = serde_json::from_str("\"booked\"").unwrap();
        assert_eq!(parsed, LockerStatus::Booked);
    }

    #[test]
    fn test_locker_status_from_str() {
        assert_eq!(
            "available".parse::<LockerStatus>().unwrap(),
            LockerStatus::Available
        );
        assert!("reserved".parse::<LockerStatus>().is_err());
    }

    #[test]
    fn test_display_matches_column_value() {
        for status in [
            LockerStatus::Available,
            LockerStatus::Pending,
            LockerStatus::Booked,
        ] {
            assert_eq!(status.to_string(), status.as_str());
        }
    }
}
