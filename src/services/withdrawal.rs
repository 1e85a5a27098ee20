use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    EmailAttachment, NotificationInput, OutboundEmailInput, Player, PlayerStatus,
    TerminateLinkInput,
};
use crate::database::repositories::{
    AthleteRepository, MembershipRepository, PlayerRepository, TeamRepository, UserRepository,
};
use crate::error::AppError;
use crate::services::{MailerService, NotificationService};

/// Parent- and club-initiated paths out of a club. The parent path goes
/// through the cool-off (ACTIVE -> PENDING_WITHDRAWAL, completed later by
/// the reconciler); the club path terminates immediately.
#[derive(Clone)]
pub struct WithdrawalService {
    pool: PgPool,
    athlete_repository: AthleteRepository,
    player_repository: PlayerRepository,
    membership_repository: MembershipRepository,
    team_repository: TeamRepository,
    user_repository: UserRepository,
    notifier: NotificationService,
    mailer: MailerService,
}

impl WithdrawalService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        athlete_repository: AthleteRepository,
        player_repository: PlayerRepository,
        membership_repository: MembershipRepository,
        team_repository: TeamRepository,
        user_repository: UserRepository,
        notifier: NotificationService,
        mailer: MailerService,
    ) -> Self {
        Self {
            pool,
            athlete_repository,
            player_repository,
            membership_repository,
            team_repository,
            user_repository,
            notifier,
            mailer,
        }
    }

    /// Start the cool-off. The player stays on the roster as
    /// PENDING_WITHDRAWAL until the reconciler completes the release or
    /// the parent cancels.
    pub async fn request_withdrawal(
        &self,
        guardian_id: Uuid,
        athlete_id: Uuid,
    ) -> Result<Player, AppError> {
        let player = self.owned_live_player(guardian_id, athlete_id).await?;

        if !player.status.can_transition_to(PlayerStatus::PendingWithdrawal) {
            return Err(AppError::BadRequest(
                "Withdrawal is only available for an active membership".to_string(),
            ));
        }

        let player = self
            .player_repository
            .mark_pending_withdrawal(player.id, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Membership is no longer active".to_string())
            })?;

        self.notify_club_admins(&player).await;

        Ok(player)
    }

    /// Cancel while the reconciler has not finalized yet; afterwards the
    /// status CAS finds nothing to revert and this reports BadRequest.
    pub async fn cancel_withdrawal(
        &self,
        guardian_id: Uuid,
        athlete_id: Uuid,
    ) -> Result<Player, AppError> {
        let player = self.owned_live_player(guardian_id, athlete_id).await?;

        if !player.status.can_transition_to(PlayerStatus::Active) {
            return Err(AppError::BadRequest(
                "No pending withdrawal to cancel".to_string(),
            ));
        }

        let player = self
            .player_repository
            .cancel_pending_withdrawal(player.id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Withdrawal was already completed".to_string())
            })?;

        Ok(player)
    }

    /// Club-initiated termination: immediate LEFT, no cool-off, paperwork
    /// recorded, athlete released, optional package to the destination
    /// club. The mail dispatch is best-effort and happens after commit.
    pub async fn terminate_link(
        &self,
        club_id: Uuid,
        player_id: Uuid,
        details: TerminateLinkInput,
    ) -> Result<Player, AppError> {
        let player = self
            .player_repository
            .find_by_id_for_club(player_id, club_id)
            .await?
            .ok_or_else(|| AppError::not_found("Player"))?;

        if !player.status.can_transition_to(PlayerStatus::Left) {
            return Err(AppError::BadRequest(
                "Player has already left the club".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let terminated = self
            .player_repository
            .terminate(&mut tx, player.id, &details)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Player has already left the club".to_string())
            })?;

        self.team_repository
            .close_open_memberships(&mut tx, player.id, now)
            .await?;

        if let Some(athlete_id) = player.athlete_id {
            self.membership_repository
                .release_athlete(&mut tx, athlete_id)
                .await?;
        }

        tx.commit().await.map_err(AppError::from)?;

        if details.send_package {
            if let Some(recipient) = details.destination_club_email.as_deref() {
                self.send_withdrawal_package(&terminated, recipient, &details)
                    .await;
            }
        }

        Ok(terminated)
    }

    async fn owned_live_player(
        &self,
        guardian_id: Uuid,
        athlete_id: Uuid,
    ) -> Result<Player, AppError> {
        let athlete = self
            .athlete_repository
            .find_by_id(athlete_id)
            .await?
            .ok_or_else(|| AppError::not_found("Athlete"))?;

        if athlete.guardian_id != guardian_id {
            return Err(AppError::Forbidden("Not your athlete".to_string()));
        }

        let player = self
            .membership_repository
            .find_active_player(athlete_id)
            .await?
            .ok_or_else(|| AppError::not_found("Active membership"))?;

        Ok(player)
    }

    async fn notify_club_admins(&self, player: &Player) {
        let admins = match self.user_repository.find_admins_for_club(player.club_id).await {
            Ok(admins) => admins,
            Err(err) => {
                log::warn!(
                    "Could not load admins of club {} for withdrawal notice: {}",
                    player.club_id,
                    err
                );
                return;
            }
        };

        let admin_ids: Vec<Uuid> = admins.iter().map(|a| a.id).collect();
        self.notifier
            .notify_users(
                &admin_ids,
                NotificationInput {
                    club_id: player.club_id,
                    user_id: Uuid::nil(), // replaced per recipient
                    kind: "withdrawal_requested".to_string(),
                    title: "Withdrawal requested".to_string(),
                    message: format!(
                        "{} {} has requested to leave the club. The request can be cancelled for 24 hours.",
                        player.first_name, player.last_name
                    ),
                    related_entity_type: Some("player".to_string()),
                    related_entity_id: Some(player.id),
                    action_url: Some(format!("/players/{}", player.id)),
                },
            )
            .await;
    }

    async fn send_withdrawal_package(
        &self,
        player: &Player,
        recipient: &str,
        details: &TerminateLinkInput,
    ) {
        let letter_ref = details.letter_reference.as_deref().unwrap_or("n/a");
        let mut attachments = vec![EmailAttachment::from_bytes(
            "withdrawal-letter.txt",
            format!(
                "Withdrawal letter {} for {} {}",
                letter_ref, player.first_name, player.last_name
            )
            .as_bytes(),
        )];

        if let Some(notes) = player.medical_notes.as_deref() {
            attachments.push(EmailAttachment::from_bytes(
                "medical-certificate.txt",
                notes.as_bytes(),
            ));
        }

        self.mailer
            .send(OutboundEmailInput {
                recipient: recipient.to_string(),
                subject: format!(
                    "Withdrawal package for {} {}",
                    player.first_name, player.last_name
                ),
                html_body: format!(
                    "<p>{} {} has been released. Letter reference: {}.</p>",
                    player.first_name, player.last_name, letter_ref
                ),
                attachments,
            })
            .await;
    }
}
