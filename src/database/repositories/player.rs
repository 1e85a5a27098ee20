use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{Athlete, MedicalStatus, Player, PlayerStatus, RosterPlayer, TerminateLinkInput},
    utils::sql,
};

pub(crate) const PLAYER_COLUMNS: &str = r#"
    id,
    club_id,
    athlete_id,
    parent_user_id,
    first_name,
    last_name,
    birth_date,
    medical_notes,
    status,
    medical_status,
    team_id,
    withdrawal_requested_at,
    withdrawal_reason,
    destination_club_email,
    withdrawal_letter_ref,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct PlayerRepository {
    pool: PgPool,
}

impl PlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Materialize a club membership from an approved transfer, copying
    /// identity and medical fields off the passport. Runs inside the
    /// approval transaction.
    pub async fn create_from_athlete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        athlete: &Athlete,
        club_id: Uuid,
        parent_user_id: Uuid,
    ) -> Result<Player> {
        let now = Utc::now();

        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            r#"
            INSERT INTO
                players (
                    club_id,
                    athlete_id,
                    parent_user_id,
                    first_name,
                    last_name,
                    birth_date,
                    medical_notes,
                    status,
                    medical_status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {PLAYER_COLUMNS}
            "#
        )))
        .bind(club_id)
        .bind(athlete.id)
        .bind(parent_user_id)
        .bind(&athlete.first_name)
        .bind(&athlete.last_name)
        .bind(athlete.birth_date)
        .bind(&athlete.medical_notes)
        .bind(PlayerStatus::Active)
        .bind(MedicalStatus::Fit)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(player)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    pub async fn find_by_id_for_club(&self, id: Uuid, club_id: Uuid) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = ? AND club_id = ?"
        )))
        .bind(id)
        .bind(club_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    /// Live membership of an athlete inside one club, used when a parent
    /// submits an absence notice.
    pub async fn find_live_by_athlete_and_club(
        &self,
        athlete_id: Uuid,
        club_id: Uuid,
    ) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            r#"
            SELECT {PLAYER_COLUMNS}
            FROM players
            WHERE
                athlete_id = ?
                AND club_id = ?
                AND status IN ('active', 'pending_withdrawal')
            "#
        )))
        .bind(athlete_id)
        .bind(club_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    /// Flip ACTIVE to PENDING_WITHDRAWAL and stamp the request time. The
    /// status predicate makes the write a compare-and-set.
    pub async fn mark_pending_withdrawal(
        &self,
        player_id: Uuid,
        requested_at: DateTime<Utc>,
    ) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            r#"
            UPDATE players
            SET
                status = 'pending_withdrawal',
                withdrawal_requested_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'active'
            RETURNING {PLAYER_COLUMNS}
            "#
        )))
        .bind(requested_at)
        .bind(Utc::now())
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    /// Revert a pending withdrawal. Loses against a reconciler that has
    /// already finalized the row, by design of the status predicate.
    pub async fn cancel_pending_withdrawal(&self, player_id: Uuid) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            r#"
            UPDATE players
            SET
                status = 'active',
                withdrawal_requested_at = NULL,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending_withdrawal'
            RETURNING {PLAYER_COLUMNS}
            "#
        )))
        .bind(Utc::now())
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    /// Club-initiated termination: LEFT immediately, team cleared, the
    /// withdrawal paperwork recorded. CAS on not-yet-LEFT.
    pub async fn terminate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        player_id: Uuid,
        details: &TerminateLinkInput,
    ) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            r#"
            UPDATE players
            SET
                status = 'left',
                team_id = NULL,
                withdrawal_reason = ?,
                withdrawal_letter_ref = ?,
                destination_club_email = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status <> 'left'
            RETURNING {PLAYER_COLUMNS}
            "#
        )))
        .bind(&details.reason)
        .bind(&details.letter_reference)
        .bind(&details.destination_club_email)
        .bind(Utc::now())
        .bind(player_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(player)
    }

    /// Reconciler write: PENDING_WITHDRAWAL to LEFT, conditioned on the
    /// status still being pending at write time so a concurrent cancel is
    /// never revived.
    pub async fn complete_withdrawal(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        player_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(&sql(r#"
            UPDATE players
            SET
                status = 'left',
                team_id = NULL,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending_withdrawal'
        "#))
        .bind(Utc::now())
        .bind(player_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Sweep selection: pending withdrawals whose cool-off elapsed before
    /// the cutoff. Already-LEFT rows never match, which is what makes the
    /// sweep idempotent.
    pub async fn find_withdrawals_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(&sql(&format!(
            r#"
            SELECT {PLAYER_COLUMNS}
            FROM players
            WHERE
                status = 'pending_withdrawal'
                AND withdrawal_requested_at <= ?
            ORDER BY withdrawal_requested_at
            "#
        )))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }

    pub async fn set_medical_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        player_id: Uuid,
        medical_status: MedicalStatus,
    ) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE players
            SET
                medical_status = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(medical_status)
        .bind(Utc::now())
        .bind(player_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Team roster with the medical gate precomputed: a player is unfit
    /// when flagged injured/sick or when an open injury row exists.
    pub async fn roster_with_fitness(&self, team_id: Uuid) -> Result<Vec<RosterPlayer>> {
        let roster = sqlx::query_as::<_, RosterPlayer>(&sql(r#"
            SELECT
                p.id AS player_id,
                p.medical_status,
                EXISTS (
                    SELECT 1
                    FROM injuries i
                    WHERE i.player_id = p.id AND i.ended_on IS NULL
                ) AS has_open_injury
            FROM players p
            WHERE
                p.team_id = ?
                AND p.status IN ('active', 'pending_withdrawal')
        "#))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roster)
    }
}
