//! Locker rows.

use serde::{Deserialize, Serialize};

use rocky_gym_core::{LockerId, LockerStatus};

use crate::supabase::Record;

/// A physical locker as stored in the `lockers` table.
///
/// `available` is expected to be `true` exactly when `status` is
/// [`LockerStatus::Available`]. Nothing here enforces that; staff edit rows
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locker {
    pub id: LockerId,
    /// Label painted on the locker door (e.g., "B3").
    pub number: String,
    pub available: bool,
    pub status: LockerStatus,
}

impl Record for Locker {
    const TABLE: &'static str = "lockers";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_row() {
        let locker: Locker = serde_json::from_str(
            r#"{"id": 7, "number": "B3", "available": true, "status": "available"}"#,
        )
        .unwrap();
        assert_eq!(locker.id, LockerId::new(7));
        assert!(locker.available);
        assert_eq!(locker.status, LockerStatus::Available);
    }
}
