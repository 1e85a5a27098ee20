use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{AbsenceNotice, AbsenceNoticeStatus, AbsenceNoticeType},
    utils::sql,
};

const NOTICE_COLUMNS: &str = r#"
    id,
    club_id,
    training_id,
    athlete_id,
    player_id,
    notice_type,
    reason,
    status,
    reviewed_by,
    reviewed_at,
    injury_id,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct AbsenceNoticeRepository {
    pool: PgPool,
}

impl AbsenceNoticeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        club_id: Uuid,
        training_id: Uuid,
        athlete_id: Uuid,
        player_id: Option<Uuid>,
        notice_type: AbsenceNoticeType,
        reason: Option<String>,
    ) -> Result<AbsenceNotice> {
        let now = Utc::now();

        let notice = sqlx::query_as::<_, AbsenceNotice>(&sql(&format!(
            r#"
            INSERT INTO
                absence_notices (
                    club_id,
                    training_id,
                    athlete_id,
                    player_id,
                    notice_type,
                    reason,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {NOTICE_COLUMNS}
            "#
        )))
        .bind(club_id)
        .bind(training_id)
        .bind(athlete_id)
        .bind(player_id)
        .bind(notice_type)
        .bind(reason)
        .bind(AbsenceNoticeStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(notice)
    }

    pub async fn find_by_id_for_club(&self, id: Uuid, club_id: Uuid) -> Result<Option<AbsenceNotice>> {
        let notice = sqlx::query_as::<_, AbsenceNotice>(&sql(&format!(
            "SELECT {NOTICE_COLUMNS} FROM absence_notices WHERE id = ? AND club_id = ?"
        )))
        .bind(id)
        .bind(club_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notice)
    }

    /// Review write inside the approval transaction; CAS on PENDING.
    pub async fn approve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
        injury_id: Option<Uuid>,
    ) -> Result<Option<AbsenceNotice>> {
        let notice = sqlx::query_as::<_, AbsenceNotice>(&sql(&format!(
            r#"
            UPDATE absence_notices
            SET
                status = 'approved',
                reviewed_by = ?,
                reviewed_at = ?,
                injury_id = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending'
            RETURNING {NOTICE_COLUMNS}
            "#
        )))
        .bind(reviewed_by)
        .bind(reviewed_at)
        .bind(injury_id)
        .bind(reviewed_at)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(notice)
    }

    pub async fn dismiss(
        &self,
        id: Uuid,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Option<AbsenceNotice>> {
        let notice = sqlx::query_as::<_, AbsenceNotice>(&sql(&format!(
            r#"
            UPDATE absence_notices
            SET
                status = 'dismissed',
                reviewed_by = ?,
                reviewed_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending'
            RETURNING {NOTICE_COLUMNS}
            "#
        )))
        .bind(reviewed_by)
        .bind(reviewed_at)
        .bind(reviewed_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notice)
    }

    pub async fn list_for_club(
        &self,
        club_id: Uuid,
        status: Option<AbsenceNoticeStatus>,
    ) -> Result<Vec<AbsenceNotice>> {
        let notices = sqlx::query_as::<_, AbsenceNotice>(&sql(&format!(
            r#"
            SELECT {NOTICE_COLUMNS}
            FROM absence_notices
            WHERE
                club_id = ?
                AND (?::VARCHAR IS NULL OR status = ?)
            ORDER BY created_at DESC
            "#
        )))
        .bind(club_id)
        .bind(status)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(notices)
    }
}
