use crate::database::models::OutboundEmailInput;
use crate::database::repositories::MailOutboxRepository;

/// Mail sink used by club-initiated termination. Messages land in the
/// outbox table; delivery is someone else's job. Best-effort: a failed
/// enqueue is logged and never aborts the caller's transaction.
#[derive(Clone)]
pub struct MailerService {
    outbox: MailOutboxRepository,
}

impl MailerService {
    pub fn new(outbox: MailOutboxRepository) -> Self {
        Self { outbox }
    }

    pub async fn send(&self, email: OutboundEmailInput) {
        match self.outbox.enqueue(&email).await {
            Ok(queued) => {
                log::info!("Queued email {} to {}", queued.id, queued.recipient);
            }
            Err(err) => {
                log::warn!("Failed to queue email to {}: {}", email.recipient, err);
            }
        }
    }
}
