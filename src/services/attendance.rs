use chrono::Utc;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::database::models::{
    AttendanceEntry, AttendanceStatus, RosterPlayer, Training, TrainingAttendance, TrainingState,
};
use crate::database::repositories::{AttendanceRepository, PlayerRepository, TrainingRepository};
use crate::error::AppError;

pub const MEDICAL_ABSENCE_NOTE: &str = "Automatically excused: player is medically unfit";

/// Attendance marking and the one-way finalize lock on a session.
#[derive(Clone)]
pub struct AttendanceService {
    pool: PgPool,
    training_repository: TrainingRepository,
    attendance_repository: AttendanceRepository,
    player_repository: PlayerRepository,
}

impl AttendanceService {
    pub fn new(
        pool: PgPool,
        training_repository: TrainingRepository,
        attendance_repository: AttendanceRepository,
        player_repository: PlayerRepository,
    ) -> Self {
        Self {
            pool,
            training_repository,
            attendance_repository,
            player_repository,
        }
    }

    /// Upsert attendance for a session. Medically unfit roster players are
    /// forced ABSENT before validation, whatever the caller sent; the
    /// finalized flag is re-checked under lock inside the same transaction
    /// as the writes.
    pub async fn mark_attendance(
        &self,
        club_id: Uuid,
        marked_by: Uuid,
        training_id: Uuid,
        entries: Vec<AttendanceEntry>,
    ) -> Result<Vec<TrainingAttendance>, AppError> {
        let training = self.club_training(club_id, training_id).await?;

        if training.is_finalized {
            return Err(AppError::BadRequest(
                "Training has been finalized".to_string(),
            ));
        }

        let roster = self
            .player_repository
            .roster_with_fitness(training.team_id)
            .await?;

        let entries = apply_medical_overrides(&roster, entries);
        validate_entries(&roster, &entries)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // The guard and the writes must see the same flag state; a
        // finalize racing this call blocks on the row lock and then
        // either loses or this call fails here.
        match self
            .training_repository
            .lock_finalized_flag(&mut tx, training.id)
            .await?
        {
            Some(false) => {}
            Some(true) => {
                return Err(AppError::BadRequest(
                    "Training has been finalized".to_string(),
                ));
            }
            None => return Err(AppError::not_found("Training")),
        }

        let mut saved = Vec::with_capacity(entries.len());
        for entry in &entries {
            let row = self
                .attendance_repository
                .upsert(&mut tx, training.id, entry, marked_by, now)
                .await?;
            saved.push(row);
        }

        tx.commit().await.map_err(AppError::from)?;

        Ok(saved)
    }

    /// One-way lock, available from the scheduled session end onwards.
    pub async fn finalize(
        &self,
        club_id: Uuid,
        finalized_by: Uuid,
        training_id: Uuid,
    ) -> Result<Training, AppError> {
        let training = self.club_training(club_id, training_id).await?;

        if !training.state().can_transition_to(TrainingState::Finalized) {
            return Err(AppError::BadRequest(
                "Training is already finalized".to_string(),
            ));
        }

        let now = Utc::now();
        if now < training.session_end() {
            return Err(AppError::BadRequest(format!(
                "Training cannot be finalized before its scheduled end at {}",
                training.session_end()
            )));
        }

        let finalized = self
            .training_repository
            .finalize(training.id, finalized_by, now)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Training is already finalized".to_string())
            })?;

        Ok(finalized)
    }

    pub async fn list_attendance(
        &self,
        club_id: Uuid,
        training_id: Uuid,
    ) -> Result<Vec<TrainingAttendance>, AppError> {
        let training = self.club_training(club_id, training_id).await?;
        Ok(self
            .attendance_repository
            .list_for_training(training.id)
            .await?)
    }

    async fn club_training(&self, club_id: Uuid, training_id: Uuid) -> Result<Training, AppError> {
        self.training_repository
            .find_by_id_for_club(training_id, club_id)
            .await?
            .ok_or_else(|| AppError::not_found("Training"))
    }
}

/// Force an ABSENT mark for every unfit roster player, overriding whatever
/// the caller supplied and injecting an entry when the player was omitted.
/// This runs before validation; the unfit-PRESENT check below should be
/// unreachable afterwards and stays as a second line of defense.
pub fn apply_medical_overrides(
    roster: &[RosterPlayer],
    entries: Vec<AttendanceEntry>,
) -> Vec<AttendanceEntry> {
    let unfit: HashSet<Uuid> = roster
        .iter()
        .filter(|p| p.is_unfit())
        .map(|p| p.player_id)
        .collect();

    let mut result: Vec<AttendanceEntry> = entries
        .into_iter()
        .map(|entry| {
            if unfit.contains(&entry.player_id) {
                AttendanceEntry {
                    player_id: entry.player_id,
                    status: AttendanceStatus::Absent,
                    justification: Some(MEDICAL_ABSENCE_NOTE.to_string()),
                }
            } else {
                entry
            }
        })
        .collect();

    for player_id in &unfit {
        if !result.iter().any(|e| e.player_id == *player_id) {
            result.push(AttendanceEntry {
                player_id: *player_id,
                status: AttendanceStatus::Absent,
                justification: Some(MEDICAL_ABSENCE_NOTE.to_string()),
            });
        }
    }

    result
}

/// Entries must target roster players, and no unfit player may be PRESENT.
pub fn validate_entries(
    roster: &[RosterPlayer],
    entries: &[AttendanceEntry],
) -> Result<(), AppError> {
    let by_id: HashMap<Uuid, &RosterPlayer> =
        roster.iter().map(|p| (p.player_id, p)).collect();

    for entry in entries {
        let Some(player) = by_id.get(&entry.player_id) else {
            return Err(AppError::BadRequest(format!(
                "Player {} is not on this training's team",
                entry.player_id
            )));
        };

        if player.is_unfit() && entry.status == AttendanceStatus::Present {
            return Err(AppError::BadRequest(format!(
                "Player {} is medically unfit and cannot be present",
                entry.player_id
            )));
        }
    }

    Ok(())
}
