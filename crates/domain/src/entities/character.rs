//! User-owned characters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, RaceId, UserId};

/// A character created by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub user_id: UserId,
    pub name: String,
    pub race_id: RaceId,
    /// Joined from the race on read
    pub race_name: Option<String>,
    pub alignment_id: i64,
    pub age: Option<i64>,
    pub height: Option<i64>,
    pub weight: Option<i64>,
    pub eyes: Option<String>,
    pub hair: Option<String>,
    pub gender: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Character {
    /// Whether `user_id` may modify this character.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
