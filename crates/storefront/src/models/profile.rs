//! Profile image rows.

use serde::{Deserialize, Serialize};

use rocky_gym_core::{ProfileImageId, UserId};

use crate::supabase::Record;

/// A row of `profileImage`, holding the public URL of a member's avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileImage {
    pub id: ProfileImageId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub image: String,
}

impl Record for ProfileImage {
    const TABLE: &'static str = "profileImage";
}

/// Insert payload for `profileImage`.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfileImage {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub image: String,
}
