use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum InjuryStatus {
        Open => "open",
        Healed => "healed",
    }
}

/// Club-scoped medical record. An injury with no end date counts as open
/// and gates attendance regardless of the player's medical flag.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Injury {
    pub id: Uuid,
    pub club_id: Uuid,
    pub player_id: Uuid,
    pub status: InjuryStatus,
    pub diagnosis: String,
    pub started_on: NaiveDate,
    pub ended_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Injury {
    pub fn is_open(&self) -> bool {
        self.ended_on.is_none()
    }
}

#[derive(Debug)]
pub struct CreateInjuryInput {
    pub club_id: Uuid,
    pub player_id: Uuid,
    pub diagnosis: String,
    pub started_on: NaiveDate,
    pub ended_on: Option<NaiveDate>,
}
