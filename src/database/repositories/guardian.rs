use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::Guardian, utils::sql};

const GUARDIAN_COLUMNS: &str = r#"
    id,
    email,
    password_hash,
    name,
    phone,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct GuardianRepository {
    pool: PgPool,
}

impl GuardianRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        phone: Option<&str>,
    ) -> Result<Guardian> {
        let now = Utc::now();

        let guardian = sqlx::query_as::<_, Guardian>(&sql(&format!(
            r#"
            INSERT INTO
                guardians (email, password_hash, name, phone, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING {GUARDIAN_COLUMNS}
            "#
        )))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(phone)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(guardian)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Guardian>> {
        let guardian = sqlx::query_as::<_, Guardian>(&sql(&format!(
            "SELECT {GUARDIAN_COLUMNS} FROM guardians WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(guardian)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Guardian>> {
        let guardian = sqlx::query_as::<_, Guardian>(&sql(&format!(
            "SELECT {GUARDIAN_COLUMNS} FROM guardians WHERE email = ?"
        )))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(guardian)
    }
}
