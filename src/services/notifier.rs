use futures_util::future::join_all;
use uuid::Uuid;

use crate::database::models::NotificationInput;
use crate::database::repositories::NotificationRepository;

/// Fire-and-forget notification sink. Enqueue failures are logged and
/// swallowed; the primary state transition never depends on delivery.
#[derive(Clone)]
pub struct NotificationService {
    repository: NotificationRepository,
}

impl NotificationService {
    pub fn new(repository: NotificationRepository) -> Self {
        Self { repository }
    }

    pub async fn notify(&self, input: NotificationInput) {
        if let Err(err) = self.repository.insert(&input).await {
            log::warn!(
                "Failed to enqueue notification '{}' for user {}: {}",
                input.kind,
                input.user_id,
                err
            );
        }
    }

    /// Fan one payload out to a set of users.
    pub async fn notify_users(&self, user_ids: &[Uuid], template: NotificationInput) {
        let sends = user_ids.iter().map(|user_id| {
            let input = NotificationInput {
                user_id: *user_id,
                ..template.clone()
            };
            self.notify(input)
        });
        join_all(sends).await;
    }
}
