use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Athlete, CreateAthleteInput},
    utils::sql,
};

const ATHLETE_COLUMNS: &str = r#"
    id,
    passport_code,
    guardian_id,
    first_name,
    last_name,
    birth_date,
    national_id,
    national_id_country,
    medical_notes,
    current_club_id,
    created_at,
    updated_at
"#;

#[derive(Clone)]
pub struct AthleteRepository {
    pool: PgPool,
}

impl AthleteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a passport for a guardian-owned athlete.
    pub async fn create(
        &self,
        guardian_id: Uuid,
        passport_code: &str,
        input: CreateAthleteInput,
    ) -> Result<Athlete> {
        let now = Utc::now();

        let athlete = sqlx::query_as::<_, Athlete>(&sql(&format!(
            r#"
            INSERT INTO
                athletes (
                    passport_code,
                    guardian_id,
                    first_name,
                    last_name,
                    birth_date,
                    national_id,
                    national_id_country,
                    medical_notes,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {ATHLETE_COLUMNS}
            "#
        )))
        .bind(passport_code)
        .bind(guardian_id)
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.birth_date)
        .bind(input.national_id)
        .bind(input.national_id_country)
        .bind(input.medical_notes)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(athlete)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(&sql(&format!(
            "SELECT {ATHLETE_COLUMNS} FROM athletes WHERE id = ?"
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(athlete)
    }

    pub async fn find_by_passport_code(&self, passport_code: &str) -> Result<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(&sql(&format!(
            "SELECT {ATHLETE_COLUMNS} FROM athletes WHERE passport_code = ?"
        )))
        .bind(passport_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(athlete)
    }

    /// Government-id lookup used by transfer search. The issuing country
    /// narrows the match when supplied.
    pub async fn find_by_national_id(
        &self,
        national_id: &str,
        country: Option<&str>,
    ) -> Result<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(&sql(&format!(
            r#"
            SELECT {ATHLETE_COLUMNS}
            FROM athletes
            WHERE national_id = ?
              AND (?::VARCHAR IS NULL OR national_id_country = ?)
            "#
        )))
        .bind(national_id)
        .bind(country)
        .bind(country)
        .fetch_optional(&self.pool)
        .await?;

        Ok(athlete)
    }

    pub async fn passport_code_exists(&self, passport_code: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM athletes WHERE passport_code = $1)")
                .bind(passport_code)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    pub async fn list_for_guardian(&self, guardian_id: Uuid) -> Result<Vec<Athlete>> {
        let athletes = sqlx::query_as::<_, Athlete>(&sql(&format!(
            "SELECT {ATHLETE_COLUMNS} FROM athletes WHERE guardian_id = ? ORDER BY created_at"
        )))
        .bind(guardian_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(athletes)
    }
}
