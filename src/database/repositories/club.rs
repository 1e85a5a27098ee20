use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::Club, utils::sql};

#[derive(Clone)]
pub struct ClubRepository {
    pool: PgPool,
}

impl ClubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>> {
        let club = sqlx::query_as::<_, Club>(&sql(r#"
            SELECT
                id,
                name,
                email,
                timezone,
                created_at,
                updated_at
            FROM clubs
            WHERE id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(club)
    }
}
