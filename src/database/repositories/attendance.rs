use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{AttendanceEntry, TrainingAttendance},
    utils::sql,
};

const ATTENDANCE_COLUMNS: &str = r#"
    id,
    training_id,
    player_id,
    status,
    justification,
    marked_by,
    marked_at
"#;

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert keyed on (training, player): re-marking replaces the earlier
    /// row instead of inserting a duplicate.
    pub async fn upsert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        training_id: Uuid,
        entry: &AttendanceEntry,
        marked_by: Uuid,
        marked_at: DateTime<Utc>,
    ) -> Result<TrainingAttendance> {
        let attendance = sqlx::query_as::<_, TrainingAttendance>(&sql(&format!(
            r#"
            INSERT INTO
                training_attendance (training_id, player_id, status, justification, marked_by, marked_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            ON CONFLICT (training_id, player_id) DO UPDATE
            SET
                status = EXCLUDED.status,
                justification = EXCLUDED.justification,
                marked_by = EXCLUDED.marked_by,
                marked_at = EXCLUDED.marked_at
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        )))
        .bind(training_id)
        .bind(entry.player_id)
        .bind(entry.status)
        .bind(&entry.justification)
        .bind(marked_by)
        .bind(marked_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(attendance)
    }

    pub async fn list_for_training(&self, training_id: Uuid) -> Result<Vec<TrainingAttendance>> {
        let rows = sqlx::query_as::<_, TrainingAttendance>(&sql(&format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM training_attendance
            WHERE training_id = ?
            ORDER BY marked_at
            "#
        )))
        .bind(training_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_for_player(
        &self,
        training_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<TrainingAttendance>> {
        let row = sqlx::query_as::<_, TrainingAttendance>(&sql(&format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM training_attendance
            WHERE training_id = ? AND player_id = ?
            "#
        )))
        .bind(training_id)
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
