use anyhow::Result;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{ClubRole, Guardian, User},
    utils::sql,
};

const USER_COLUMNS: &str = r#"
    id,
    club_id,
    guardian_id,
    email,
    password_hash,
    name,
    role,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Earliest account for an email across clubs; enough for the minimal
    /// login surface, which re-scopes through claims afterwards.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? ORDER BY created_at LIMIT 1"
        )))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_admins_for_club(&self, club_id: Uuid) -> Result<Vec<User>> {
        let admins = sqlx::query_as::<_, User>(&sql(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE club_id = ? AND role = 'admin' ORDER BY created_at"
        )))
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(admins)
    }

    /// Club-local projection of a global guardian, created on first use.
    /// The partial unique index on (club_id, guardian_id) keeps this to
    /// one row per pair even under concurrent approvals; the guardian's
    /// credential hash is reused so no second password exists.
    pub async fn find_or_create_parent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        club_id: Uuid,
        guardian: &Guardian,
    ) -> Result<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&sql(&format!(
            r#"
            INSERT INTO
                users (club_id, guardian_id, email, password_hash, name, role, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (club_id, guardian_id) WHERE guardian_id IS NOT NULL DO UPDATE
            SET updated_at = EXCLUDED.updated_at
            RETURNING {USER_COLUMNS}
            "#
        )))
        .bind(club_id)
        .bind(guardian.id)
        .bind(&guardian.email)
        .bind(&guardian.password_hash)
        .bind(&guardian.name)
        .bind(ClubRole::Parent)
        .bind(now)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(user)
    }
}
