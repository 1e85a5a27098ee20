use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum TransferRequestStatus {
        Pending => "pending",
        Approved => "approved",
        Expired => "expired",
        Rejected => "rejected",
    }
}

impl TransferRequestStatus {
    /// Pending is the only non-terminal state.
    pub fn can_transition_to(self, next: TransferRequestStatus) -> bool {
        use TransferRequestStatus::*;
        matches!((self, next), (Pending, Approved) | (Pending, Expired) | (Pending, Rejected))
    }
}

/// Club-to-parent proposal to bind a free-agent athlete to the club.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub club_id: Uuid,
    pub status: TransferRequestStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TransferRequest {
    /// A pending request past its expiry must be treated as invalid for
    /// approval even before the row is flipped to `Expired`.
    pub fn is_approvable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == TransferRequestStatus::Pending && now < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTransferInput {
    pub passport_code: String,
}
