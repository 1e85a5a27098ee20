use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{Team, TeamMembership},
    utils::sql,
};

#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(&sql(r#"
            SELECT
                id,
                club_id,
                name,
                head_coach_user_id,
                assistant_coach_user_id,
                created_at,
                updated_at
            FROM teams
            WHERE id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(team)
    }

    /// Stamp `left_at` on a player's open team-history rows when the
    /// membership ends. Part of the withdrawal/termination transaction.
    pub async fn close_open_memberships(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        player_id: Uuid,
        left_at: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(&sql(r#"
            UPDATE team_memberships
            SET left_at = ?
            WHERE
                player_id = ?
                AND left_at IS NULL
        "#))
        .bind(left_at)
        .bind(player_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn membership_history(&self, player_id: Uuid) -> Result<Vec<TeamMembership>> {
        let rows = sqlx::query_as::<_, TeamMembership>(&sql(r#"
            SELECT
                id,
                team_id,
                player_id,
                joined_at,
                left_at
            FROM team_memberships
            WHERE player_id = ?
            ORDER BY joined_at
        "#))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
