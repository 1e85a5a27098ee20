use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

/// A scheduled team session. Finalization is monotonic: the flag is set
/// once and the row never goes back to editable.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    pub id: Uuid,
    pub club_id: Uuid,
    pub team_id: Uuid,
    pub session_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: Option<String>,
    pub coach_user_id: Option<Uuid>,
    pub is_finalized: bool,
    pub finalized_by: Option<Uuid>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Scheduled,
    Finalized,
}

impl TrainingState {
    pub fn can_transition_to(self, next: TrainingState) -> bool {
        matches!((self, next), (TrainingState::Scheduled, TrainingState::Finalized))
    }
}

impl Training {
    pub fn state(&self) -> TrainingState {
        if self.is_finalized {
            TrainingState::Finalized
        } else {
            TrainingState::Scheduled
        }
    }

    /// Scheduled end instant, session date combined with the end-of-day
    /// time. Session times are kept in UTC.
    pub fn session_end(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.session_date.and_time(self.end_time))
    }

    /// Finalization opens at the session end, not before.
    pub fn can_finalize_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_finalized && now >= self.session_end()
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Justified => "justified",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainingAttendance {
    pub id: Uuid,
    pub training_id: Uuid,
    pub player_id: Uuid,
    pub status: AttendanceStatus,
    pub justification: Option<String>,
    pub marked_by: Uuid,
    pub marked_at: DateTime<Utc>,
}

/// One caller-supplied attendance mark; upserted per (training, player).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub player_id: Uuid,
    pub status: AttendanceStatus,
    pub justification: Option<String>,
}

/// Roster view used by attendance marking: the membership check and the
/// medical gate are computed in one query, open injuries included.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RosterPlayer {
    pub player_id: Uuid,
    pub medical_status: super::player::MedicalStatus,
    pub has_open_injury: bool,
}

impl RosterPlayer {
    pub fn is_unfit(&self) -> bool {
        self.medical_status.blocks_participation() || self.has_open_injury
    }
}
