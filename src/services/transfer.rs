use chrono::{Duration, Utc};
use regex::Regex;
use sqlx::PgPool;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{
    Athlete, AthleteMatch, AthleteSearchQuery, Guardian, Player, TransferRequest,
    TransferRequestStatus,
};
use crate::database::repositories::{
    AthleteRepository, GuardianRepository, MembershipRepository, PlayerRepository,
    TransferRequestRepository, UserRepository,
};
use crate::error::AppError;

fn passport_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^ATH-[2-9A-HJ-NP-Z]{8}$").expect("valid pattern"))
}

/// Club-to-parent transfer protocol: search a free agent, propose the
/// transfer, and complete the binding on the guardian's approval.
#[derive(Clone)]
pub struct TransferService {
    pool: PgPool,
    athlete_repository: AthleteRepository,
    transfer_repository: TransferRequestRepository,
    membership_repository: MembershipRepository,
    player_repository: PlayerRepository,
    user_repository: UserRepository,
    guardian_repository: GuardianRepository,
    config: Config,
}

impl TransferService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        athlete_repository: AthleteRepository,
        transfer_repository: TransferRequestRepository,
        membership_repository: MembershipRepository,
        player_repository: PlayerRepository,
        user_repository: UserRepository,
        guardian_repository: GuardianRepository,
        config: Config,
    ) -> Self {
        Self {
            pool,
            athlete_repository,
            transfer_repository,
            membership_repository,
            player_repository,
            user_repository,
            guardian_repository,
            config,
        }
    }

    /// Lookup by passport code or government id. Only non-sensitive
    /// confirmation fields come back; enough for a club to verify it found
    /// the right child, nothing more.
    pub async fn search(&self, query: &AthleteSearchQuery) -> Result<AthleteMatch, AppError> {
        let athlete = if let Some(code) = query.passport_code.as_deref() {
            let code = code.trim().to_uppercase();
            if !passport_code_pattern().is_match(&code) {
                return Err(AppError::BadRequest("Malformed passport code".to_string()));
            }
            self.athlete_repository.find_by_passport_code(&code).await?
        } else if let Some(national_id) = query.national_id.as_deref() {
            self.athlete_repository
                .find_by_national_id(national_id, query.national_id_country.as_deref())
                .await?
        } else {
            return Err(AppError::BadRequest(
                "Provide a passport code or a national id".to_string(),
            ));
        };

        athlete
            .as_ref()
            .map(AthleteMatch::from)
            .ok_or_else(|| AppError::not_found("Athlete"))
    }

    /// Propose binding a free agent. Idempotent per (club, athlete): an
    /// existing live PENDING request is returned unchanged.
    pub async fn request_transfer(
        &self,
        club_id: Uuid,
        passport_code: &str,
    ) -> Result<TransferRequest, AppError> {
        let code = passport_code.trim().to_uppercase();
        let athlete = self
            .athlete_repository
            .find_by_passport_code(&code)
            .await?
            .ok_or_else(|| AppError::not_found("Athlete"))?;

        if athlete.current_club_id.is_some() {
            return Err(AppError::BadRequest(
                "Athlete is already registered with a club and must be released first".to_string(),
            ));
        }

        let now = Utc::now();
        if let Some(existing) = self
            .transfer_repository
            .find_live_pending(athlete.id, club_id, now)
            .await?
        {
            return Ok(existing);
        }

        let expires_at = now + Duration::days(self.config.transfer_expiry_days);
        let request = self
            .transfer_repository
            .create(athlete.id, club_id, expires_at)
            .await?;

        Ok(request)
    }

    /// Guardian-side approval. The request must be PENDING and unexpired;
    /// an expired one is retired on the spot and rejected. Approval,
    /// binding, the club-local parent user and the player row all commit
    /// in one transaction.
    pub async fn approve_transfer(
        &self,
        guardian_id: Uuid,
        request_id: Uuid,
    ) -> Result<Player, AppError> {
        let request = self
            .transfer_repository
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Transfer request"))?;

        let athlete = self
            .athlete_repository
            .find_by_id(request.athlete_id)
            .await?
            .ok_or_else(|| AppError::not_found("Athlete"))?;

        if athlete.guardian_id != guardian_id {
            return Err(AppError::Forbidden(
                "Request targets an athlete you do not own".to_string(),
            ));
        }

        let now = Utc::now();
        if !request.is_approvable_at(now) {
            if request.status == TransferRequestStatus::Pending {
                // Pending but past expiry: retire it while rejecting.
                self.transfer_repository.mark_expired(request.id).await?;
                return Err(AppError::BadRequest("Transfer request has expired".to_string()));
            }
            return Err(AppError::BadRequest(
                "Transfer request is not pending".to_string(),
            ));
        }

        let guardian = self
            .guardian_repository
            .find_by_id(guardian_id)
            .await?
            .ok_or_else(|| AppError::not_found("Guardian"))?;

        let player = self
            .complete_approval(&request, &athlete, &guardian, now)
            .await?;

        Ok(player)
    }

    async fn complete_approval(
        &self,
        request: &TransferRequest,
        athlete: &Athlete,
        guardian: &Guardian,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Player, AppError> {
        let mut tx = self.pool.begin().await?;

        // CAS on PENDING: the second of two racing approvals sees zero
        // rows and performs no further writes.
        if !self.transfer_repository.approve(&mut tx, request.id, now).await? {
            return Err(AppError::BadRequest(
                "Transfer request is not pending".to_string(),
            ));
        }

        if !self
            .membership_repository
            .bind_athlete_to_club(&mut tx, athlete.id, request.club_id)
            .await?
        {
            return Err(AppError::BadRequest(
                "Athlete was registered with a club in the meantime".to_string(),
            ));
        }

        let parent_user = self
            .user_repository
            .find_or_create_parent(&mut tx, request.club_id, guardian)
            .await?;

        let player = self
            .player_repository
            .create_from_athlete(&mut tx, athlete, request.club_id, parent_user.id)
            .await?;

        tx.commit().await.map_err(AppError::from)?;

        log::info!(
            "Transfer {} approved: athlete {} bound to club {}",
            request.id,
            athlete.id,
            request.club_id
        );

        Ok(player)
    }
}
