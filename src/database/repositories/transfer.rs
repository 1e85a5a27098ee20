use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{TransferRequest, TransferRequestStatus},
    utils::sql,
};

const TRANSFER_COLUMNS: &str = r#"
    id,
    athlete_id,
    club_id,
    status,
    created_at,
    expires_at,
    resolved_at,
    updated_at
"#;

#[derive(Clone)]
pub struct TransferRequestRepository {
    pool: PgPool,
}

impl TransferRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        athlete_id: Uuid,
        club_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<TransferRequest> {
        let now = Utc::now();

        let request = sqlx::query_as::<_, TransferRequest>(&sql(&format!(
            r#"
            INSERT INTO
                transfer_requests (athlete_id, club_id, status, created_at, expires_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING {TRANSFER_COLUMNS}
            "#
        )))
        .bind(athlete_id)
        .bind(club_id)
        .bind(TransferRequestStatus::Pending)
        .bind(now)
        .bind(expires_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TransferRequest>> {
        let request = sqlx::query_as::<_, TransferRequest>(&sql(&format!(
            "SELECT {TRANSFER_COLUMNS} FROM transfer_requests WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// The live PENDING request a club already holds for an athlete, used
    /// to keep `request_transfer` idempotent.
    pub async fn find_live_pending(
        &self,
        athlete_id: Uuid,
        club_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<TransferRequest>> {
        let request = sqlx::query_as::<_, TransferRequest>(&sql(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfer_requests
            WHERE
                athlete_id = ?
                AND club_id = ?
                AND status = 'pending'
                AND expires_at > ?
            ORDER BY created_at DESC
            LIMIT 1
            "#
        )))
        .bind(athlete_id)
        .bind(club_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Approval write, compare-and-set on PENDING so a double submission
    /// performs no second mutation.
    pub async fn approve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        resolved_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(&sql(r#"
            UPDATE transfer_requests
            SET
                status = 'approved',
                resolved_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending'
        "#))
        .bind(resolved_at)
        .bind(resolved_at)
        .bind(id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Lazily retire a PENDING request discovered past its expiry.
    pub async fn mark_expired(&self, id: Uuid) -> Result<()> {
        sqlx::query(&sql(r#"
            UPDATE transfer_requests
            SET
                status = 'expired',
                resolved_at = ?,
                updated_at = ?
            WHERE
                id = ?
                AND status = 'pending'
        "#))
        .bind(Utc::now())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_club(
        &self,
        club_id: Uuid,
        status: Option<TransferRequestStatus>,
    ) -> Result<Vec<TransferRequest>> {
        let requests = sqlx::query_as::<_, TransferRequest>(&sql(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM transfer_requests
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

        Ok(requests)
    }
}
