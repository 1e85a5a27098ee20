use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{models::Training, utils::sql};

const TRAINING_COLUMNS: &str = r#"
    id,
    club_id,
    team_id,
    session_date,
    start_time,
    end_time,
    location,
    coach_user_id,
    is_finalized,
    finalized_by,
    finalized_at,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct TrainingRepository {
    pool: PgPool,
}

impl TrainingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Training>> {
        let training = sqlx::query_as::<_, Training>(&sql(&format!(
            "SELECT {TRAINING_COLUMNS} FROM trainings WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(training)
    }

    pub async fn find_by_id_for_club(&self, id: Uuid, club_id: Uuid) -> Result<Option<Training>> {
        let training = sqlx::query_as::<_, Training>(&sql(&format!(
            "SELECT {TRAINING_COLUMNS} FROM trainings WHERE id = ? AND club_id = ?"
        )))
        .bind(id)
        .bind(club_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(training)
    }

    /// Re-read the finalized flag under a row lock, inside the transaction
    /// that is about to write attendance. Attendance writes and
    /// finalization serialize on this lock, so neither can slip past the
    /// other's check.
    pub async fn lock_finalized_flag(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<bool>> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT is_finalized FROM trainings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(row.map(|r| r.0))
    }

    /// One-way lock; the flag predicate makes a double finalize a no-op
    /// reported to the caller.
    pub async fn finalize(
        &self,
        id: Uuid,
        finalized_by: Uuid,
        finalized_at: DateTime<Utc>,
    ) -> Result<Option<Training>> {
        let training = sqlx::query_as::<_, Training>(&sql(&format!(
            r#"
            UPDATE trainings
            SET
                is_finalized = TRUE,
                finalized_by = ?,
                finalized_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND is_finalized = FALSE
            RETURNING {TRAINING_COLUMNS}
            "#
        )))
        .bind(finalized_by)
        .bind(finalized_at)
        .bind(finalized_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(training)
    }
}
