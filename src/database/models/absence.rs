use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum AbsenceNoticeType {
        Absence => "absence",
        Presence => "presence",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum AbsenceNoticeStatus {
        Pending => "pending",
        Approved => "approved",
        Dismissed => "dismissed",
    }
}

impl AbsenceNoticeStatus {
    pub fn can_transition_to(self, next: AbsenceNoticeStatus) -> bool {
        use AbsenceNoticeStatus::*;
        matches!((self, next), (Pending, Approved) | (Pending, Dismissed))
    }
}

/// Parent-submitted intent for one (athlete, training) pair, reviewed by
/// the club. Approval may write attendance and open a medical record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceNotice {
    pub id: Uuid,
    pub club_id: Uuid,
    pub training_id: Uuid,
    pub athlete_id: Uuid,
    pub player_id: Option<Uuid>,
    pub notice_type: AbsenceNoticeType,
    pub reason: Option<String>,
    pub status: AbsenceNoticeStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub injury_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitNoticeInput {
    pub athlete_id: Uuid,
    pub training_id: Uuid,
    pub notice_type: AbsenceNoticeType,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReviewNoticeInput {
    #[serde(default)]
    pub create_injury: bool,
    pub diagnosis: Option<String>,
    /// Optional recovery estimate used to pre-fill the injury end date.
    pub recovery_days: Option<i64>,
}
