use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{Notification, NotificationInput},
    utils::sql,
};

const NOTIFICATION_COLUMNS: &str = r#"
    id,
    club_id,
    user_id,
    kind,
    title,
    message,
    related_entity_type,
    related_entity_id,
    action_url,
    is_read,
    created_at
"#;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, input: &NotificationInput) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&sql(&format!(
            r#"
            INSERT INTO
                notifications (
                    club_id,
                    user_id,
                    kind,
                    title,
                    message,
                    related_entity_type,
                    related_entity_id,
                    action_url
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        )))
        .bind(input.club_id)
        .bind(input.user_id)
        .bind(&input.kind)
        .bind(&input.title)
        .bind(&input.message)
        .bind(&input.related_entity_type)
        .bind(input.related_entity_id)
        .bind(&input.action_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list_unread_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(&sql(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE user_id = ? AND is_read = FALSE
            ORDER BY created_at DESC
            "#
        )))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
