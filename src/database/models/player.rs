use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum PlayerStatus {
        Active => "active",
        PendingWithdrawal => "pending_withdrawal",
        Left => "left",
    }
}

impl PlayerStatus {
    /// Transition table for the withdrawal state machine. Everything not
    /// listed here is rejected; `Left` is terminal.
    pub fn can_transition_to(self, next: PlayerStatus) -> bool {
        use PlayerStatus::*;
        matches!(
            (self, next),
            (Active, PendingWithdrawal)
                | (PendingWithdrawal, Active)
                | (PendingWithdrawal, Left)
                | (Active, Left)
        )
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum MedicalStatus {
        Fit => "fit",
        Injured => "injured",
        Sick => "sick",
        Conditioned => "conditioned",
    }
}

impl MedicalStatus {
    /// Injured and sick players may not take part in sessions; conditioned
    /// players may, at the coach's discretion.
    pub fn blocks_participation(self) -> bool {
        matches!(self, MedicalStatus::Injured | MedicalStatus::Sick)
    }
}

/// Club-scoped membership row. `athlete_id` is NULL for club-local rosters
/// that never registered a global passport.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub club_id: Uuid,
    pub athlete_id: Option<Uuid>,
    pub parent_user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub medical_notes: Option<String>,
    pub status: PlayerStatus,
    pub medical_status: MedicalStatus,
    pub team_id: Option<Uuid>,
    pub withdrawal_requested_at: Option<DateTime<Utc>>,
    pub withdrawal_reason: Option<String>,
    pub destination_club_email: Option<String>,
    pub withdrawal_letter_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateLinkInput {
    pub reason: Option<String>,
    pub letter_reference: Option<String>,
    pub destination_club_email: Option<String>,
    #[serde(default)]
    pub send_package: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdrawal_machine_allows_cancel_but_not_revival() {
        assert!(PlayerStatus::Active.can_transition_to(PlayerStatus::PendingWithdrawal));
        assert!(PlayerStatus::PendingWithdrawal.can_transition_to(PlayerStatus::Active));
        assert!(PlayerStatus::PendingWithdrawal.can_transition_to(PlayerStatus::Left));
        assert!(PlayerStatus::Active.can_transition_to(PlayerStatus::Left));

        assert!(!PlayerStatus::Left.can_transition_to(PlayerStatus::Active));
        assert!(!PlayerStatus::Left.can_transition_to(PlayerStatus::PendingWithdrawal));
        assert!(!PlayerStatus::Active.can_transition_to(PlayerStatus::Active));
    }

    #[test]
    fn only_injured_and_sick_block_participation() {
        assert!(MedicalStatus::Injured.blocks_participation());
        assert!(MedicalStatus::Sick.blocks_participation());
        assert!(!MedicalStatus::Fit.blocks_participation());
        assert!(!MedicalStatus::Conditioned.blocks_participation());
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        assert_eq!(
            "pending_withdrawal".parse::<PlayerStatus>().unwrap(),
            PlayerStatus::PendingWithdrawal
        );
        assert_eq!(PlayerStatus::PendingWithdrawal.as_str(), "pending_withdrawal");
        assert!("benched".parse::<PlayerStatus>().is_err());
    }
}
