use anyhow::Result;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{models::Player, utils::sql};

use super::player::PLAYER_COLUMNS;

/// Keeps an athlete's club binding and its player row from diverging. All
/// writes are compare-and-set statements that run inside a transaction the
/// caller supplies; this store performs no locking of its own.
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claim a free agent for a club. Returns false when the athlete is
    /// already bound, so two clubs can never hold the same athlete.
    pub async fn bind_athlete_to_club(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        athlete_id: Uuid,
        club_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(&sql(r#"
            UPDATE athletes
            SET
                current_club_id = ?,
                updated_at = ?
            WHERE
                id = ?
                AND current_club_id IS NULL
        "#))
        .bind(club_id)
        .bind(Utc::now())
        .bind(athlete_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Detach the athlete from whatever club holds it. Idempotent; the
    /// matching player-status write must happen in the same transaction.
    pub async fn release_athlete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        athlete_id: Uuid,
    ) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE athletes
            SET
                current_club_id = NULL,
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(Utc::now())
        .bind(athlete_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// The single live (active or pending-withdrawal) player row for an
    /// athlete, if any. A partial unique index guarantees at most one.
    pub async fn find_active_player(&self, athlete_id: Uuid) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&sql(&format!(
            r#"
            SELECT {PLAYER_COLUMNS}
            FROM players
            WHERE
                athlete_id = ?
                AND status IN ('active', 'pending_withdrawal')
            "#
        )))
        .bind(athlete_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }
}
