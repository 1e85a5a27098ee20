use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attachment stored inline in the outbox row, content base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub filename: String,
    pub content_base64: String,
}

impl EmailAttachment {
    pub fn from_bytes(filename: impl Into<String>, content: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content_base64: base64::engine::general_purpose::STANDARD.encode(content),
        }
    }
}

/// Mail-sink payload. The core only enqueues; a delivery worker outside
/// this crate drains `outbound_emails`.
#[derive(Debug, Clone)]
pub struct OutboundEmailInput {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEmail {
    pub id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: serde_json::Value,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
