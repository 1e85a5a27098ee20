use anyhow::Result;
use sqlx::PgPool;

use crate::database::{
    models::{OutboundEmail, OutboundEmailInput},
    utils::sql,
};

#[derive(Clone)]
pub struct MailOutboxRepository {
    pool: PgPool,
}

impl MailOutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queue a message for the delivery worker; `sent_at` stays NULL until
    /// a worker outside this crate picks it up.
    pub async fn enqueue(&self, input: &OutboundEmailInput) -> Result<OutboundEmail> {
        let attachments = serde_json::to_value(&input.attachments)?;

        let email = sqlx::query_as::<_, OutboundEmail>(&sql(r#"
            INSERT INTO
                outbound_emails (recipient, subject, html_body, attachments)
            VALUES
                (?, ?, ?, ?)
            RETURNING
                id,
                recipient,
                subject,
                html_body,
                attachments,
                sent_at,
                created_at
        "#))
        .bind(&input.recipient)
        .bind(&input.subject)
        .bind(&input.html_body)
        .bind(attachments)
        .fetch_one(&self.pool)
        .await?;

        Ok(email)
    }
}
