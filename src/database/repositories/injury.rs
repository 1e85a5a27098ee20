use anyhow::Result;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{CreateInjuryInput, Injury, InjuryStatus},
    utils::sql,
};

const INJURY_COLUMNS: &str = r#"
    id,
    club_id,
    player_id,
    status,
    diagnosis,
    started_on,
    ended_on,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct InjuryRepository {
    pool: PgPool,
}

impl InjuryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a medical record. Runs inside the notice-approval transaction
    /// so the injury and the medical-status flip land together.
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        input: CreateInjuryInput,
    ) -> Result<Injury> {
        let now = Utc::now();

        let injury = sqlx::query_as::<_, Injury>(&sql(&format!(
            r#"
            INSERT INTO
                injuries (club_id, player_id, status, diagnosis, started_on, ended_on, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {INJURY_COLUMNS}
            "#
        )))
        .bind(input.club_id)
        .bind(input.player_id)
        .bind(InjuryStatus::Open)
        .bind(input.diagnosis)
        .bind(input.started_on)
        .bind(input.ended_on)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(injury)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Injury>> {
        let injury = sqlx::query_as::<_, Injury>(&sql(&format!(
            "SELECT {INJURY_COLUMNS} FROM injuries WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(injury)
    }

    pub async fn list_open_for_player(&self, player_id: Uuid) -> Result<Vec<Injury>> {
        let injuries = sqlx::query_as::<_, Injury>(&sql(&format!(
            r#"
            SELECT {INJURY_COLUMNS}
            FROM injuries
            WHERE player_id = ? AND ended_on IS NULL
            ORDER BY started_on DESC
            "#
        )))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(injuries)
    }
}
