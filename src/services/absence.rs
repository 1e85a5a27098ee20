use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    AbsenceNotice, AbsenceNoticeStatus, AbsenceNoticeType, AttendanceEntry, AttendanceStatus,
    CreateInjuryInput, MedicalStatus, NotificationInput, ReviewNoticeInput, SubmitNoticeInput,
    Team, Training,
};
use crate::database::repositories::{
    AbsenceNoticeRepository, AthleteRepository, AttendanceRepository, InjuryRepository,
    PlayerRepository, TeamRepository, TrainingRepository,
};
use crate::error::AppError;
use crate::services::NotificationService;

/// Parent-submitted absence/presence notices and their club-side review.
/// Approval can write attendance and open a medical record as one unit.
#[derive(Clone)]
pub struct AbsenceNoticeService {
    pool: PgPool,
    notice_repository: AbsenceNoticeRepository,
    training_repository: TrainingRepository,
    athlete_repository: AthleteRepository,
    player_repository: PlayerRepository,
    attendance_repository: AttendanceRepository,
    injury_repository: InjuryRepository,
    team_repository: TeamRepository,
    notifier: NotificationService,
}

impl AbsenceNoticeService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        notice_repository: AbsenceNoticeRepository,
        training_repository: TrainingRepository,
        athlete_repository: AthleteRepository,
        player_repository: PlayerRepository,
        attendance_repository: AttendanceRepository,
        injury_repository: InjuryRepository,
        team_repository: TeamRepository,
        notifier: NotificationService,
    ) -> Self {
        Self {
            pool,
            notice_repository,
            training_repository,
            athlete_repository,
            player_repository,
            attendance_repository,
            injury_repository,
            team_repository,
            notifier,
        }
    }

    /// Parent announces absence or presence for one session. The athlete
    /// must belong to the caller and hold a live membership in the
    /// training's club; sessions already finalized take no notices.
    pub async fn submit(
        &self,
        guardian_id: Uuid,
        input: SubmitNoticeInput,
    ) -> Result<AbsenceNotice, AppError> {
        let training = self
            .training_repository
            .find_by_id(input.training_id)
            .await?
            .ok_or_else(|| AppError::not_found("Training"))?;

        if training.is_finalized {
            return Err(AppError::BadRequest(
                "Training has been finalized".to_string(),
            ));
        }

        let athlete = self
            .athlete_repository
            .find_by_id(input.athlete_id)
            .await?
            .filter(|a| a.guardian_id == guardian_id)
            .ok_or_else(|| AppError::not_found("Athlete"))?;

        let player = self
            .player_repository
            .find_live_by_athlete_and_club(athlete.id, training.club_id)
            .await?
            .ok_or_else(|| AppError::not_found("Membership in this club"))?;

        let notice = self
            .notice_repository
            .create(
                training.club_id,
                training.id,
                athlete.id,
                Some(player.id),
                input.notice_type,
                input.reason,
            )
            .await?;

        self.notify_coaches(&training, &notice, &athlete.first_name, &athlete.last_name)
            .await;

        Ok(notice)
    }

    /// Approve a pending notice. For an absence with a linked player a
    /// JUSTIFIED attendance row is upserted; optionally an injury record
    /// is opened and the player flipped to INJURED, which from then on
    /// gates attendance marking. All of it commits atomically.
    pub async fn approve(
        &self,
        reviewer_id: Uuid,
        club_id: Uuid,
        notice_id: Uuid,
        options: ReviewNoticeInput,
    ) -> Result<AbsenceNotice, AppError> {
        let notice = self
            .notice_repository
            .find_by_id_for_club(notice_id, club_id)
            .await?
            .ok_or_else(|| AppError::not_found("Absence notice"))?;

        if !notice.status.can_transition_to(AbsenceNoticeStatus::Approved) {
            return Err(AppError::BadRequest("Notice is not pending".to_string()));
        }

        let attendance_player = match (notice.notice_type, notice.player_id) {
            (AbsenceNoticeType::Absence, Some(player_id)) => Some(player_id),
            _ => None,
        };

        if attendance_player.is_some() {
            let training = self
                .training_repository
                .find_by_id(notice.training_id)
                .await?
                .ok_or_else(|| AppError::not_found("Training"))?;
            if training.is_finalized {
                // The one-way lock wins over a late review.
                return Err(AppError::BadRequest(
                    "Training was finalized; attendance can no longer change".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let injury_id = if options.create_injury {
            let player_id = notice.player_id.ok_or_else(|| {
                AppError::BadRequest(
                    "Cannot open an injury record without a linked player".to_string(),
                )
            })?;

            let started_on = now.date_naive();
            let ended_on = options
                .recovery_days
                .map(|days| started_on + Duration::days(days));

            let injury = self
                .injury_repository
                .create(
                    &mut tx,
                    CreateInjuryInput {
                        club_id,
                        player_id,
                        diagnosis: options
                            .diagnosis
                            .clone()
                            .or_else(|| notice.reason.clone())
                            .unwrap_or_else(|| "Reported via absence notice".to_string()),
                        started_on,
                        ended_on,
                    },
                )
                .await?;

            self.player_repository
                .set_medical_status(&mut tx, player_id, MedicalStatus::Injured)
                .await?;

            Some(injury.id)
        } else {
            None
        };

        let approved = self
            .notice_repository
            .approve(&mut tx, notice.id, reviewer_id, now, injury_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Notice is not pending".to_string()))?;

        if let Some(player_id) = attendance_player {
            match self
                .training_repository
                .lock_finalized_flag(&mut tx, notice.training_id)
                .await?
            {
                Some(false) => {}
                _ => {
                    return Err(AppError::BadRequest(
                        "Training was finalized; attendance can no longer change".to_string(),
                    ));
                }
            }

            let entry = AttendanceEntry {
                player_id,
                status: AttendanceStatus::Justified,
                justification: notice.reason.clone(),
            };
            self.attendance_repository
                .upsert(&mut tx, notice.training_id, &entry, reviewer_id, now)
                .await?;
        }

        tx.commit().await.map_err(AppError::from)?;

        Ok(approved)
    }

    /// Dismiss a pending notice; no attendance or medical side effects.
    pub async fn dismiss(
        &self,
        reviewer_id: Uuid,
        club_id: Uuid,
        notice_id: Uuid,
    ) -> Result<AbsenceNotice, AppError> {
        let notice = self
            .notice_repository
            .find_by_id_for_club(notice_id, club_id)
            .await?
            .ok_or_else(|| AppError::not_found("Absence notice"))?;

        if !notice.status.can_transition_to(AbsenceNoticeStatus::Dismissed) {
            return Err(AppError::BadRequest("Notice is not pending".to_string()));
        }

        self.notice_repository
            .dismiss(notice.id, reviewer_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::BadRequest("Notice is not pending".to_string()))
    }

    async fn notify_coaches(
        &self,
        training: &Training,
        notice: &AbsenceNotice,
        first_name: &str,
        last_name: &str,
    ) {
        let team = match self.team_repository.find_by_id(training.team_id).await {
            Ok(Some(team)) => team,
            Ok(None) => return,
            Err(err) => {
                log::warn!(
                    "Could not load team {} for notice fan-out: {}",
                    training.team_id,
                    err
                );
                return;
            }
        };

        let coaches = session_coaches(&team, training);
        let verb = match notice.notice_type {
            AbsenceNoticeType::Absence => "will miss",
            AbsenceNoticeType::Presence => "will attend",
        };

        self.notifier
            .notify_users(
                &coaches,
                NotificationInput {
                    club_id: training.club_id,
                    user_id: Uuid::nil(), // replaced per recipient
                    kind: "absence_notice_submitted".to_string(),
                    title: "New session notice".to_string(),
                    message: format!(
                        "{} {} {} the training on {}",
                        first_name, last_name, verb, training.session_date
                    ),
                    related_entity_type: Some("absence_notice".to_string()),
                    related_entity_id: Some(notice.id),
                    action_url: Some(format!("/absence-notices/{}", notice.id)),
                },
            )
            .await;
    }
}

/// Everyone coaching the session: head coach, assistant, and the coach
/// explicitly assigned to it, deduplicated.
pub fn session_coaches(team: &Team, training: &Training) -> Vec<Uuid> {
    let mut coaches = Vec::with_capacity(3);
    for candidate in [
        team.head_coach_user_id,
        team.assistant_coach_user_id,
        training.coach_user_id,
    ]
    .into_iter()
    .flatten()
    {
        if !coaches.contains(&candidate) {
            coaches.push(candidate);
        }
    }
    coaches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn team(head: Option<Uuid>, assistant: Option<Uuid>) -> Team {
        let now = Utc::now();
        Team {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            name: "U12".to_string(),
            head_coach_user_id: head,
            assistant_coach_user_id: assistant,
            created_at: now,
            updated_at: now,
        }
    }

    fn training(team_id: Uuid, coach: Option<Uuid>) -> Training {
        let now = Utc::now();
        Training {
            id: Uuid::new_v4(),
            club_id: Uuid::new_v4(),
            team_id,
            session_date: "2026-05-02".parse().unwrap(),
            start_time: "17:00:00".parse().unwrap(),
            end_time: "18:30:00".parse().unwrap(),
            location: None,
            coach_user_id: coach,
            is_finalized: false,
            finalized_by: None,
            finalized_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn session_coaches_deduplicates_overlapping_roles() {
        let head = Uuid::new_v4();
        let assistant = Uuid::new_v4();
        let team = team(Some(head), Some(assistant));
        // The session coach is also the head coach.
        let training = training(team.id, Some(head));

        let coaches = session_coaches(&team, &training);
        assert_eq!(coaches, vec![head, assistant]);
    }

    #[test]
    fn session_coaches_skips_unset_roles() {
        let session_coach = Uuid::new_v4();
        let team = team(None, None);
        let training = training(team.id, Some(session_coach));

        assert_eq!(session_coaches(&team, &training), vec![session_coach]);
    }
}
