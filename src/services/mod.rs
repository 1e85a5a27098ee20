pub mod absence;
pub mod attendance;
pub mod auth;
pub mod mailer;
pub mod notifier;
pub mod passport;
pub mod reconciler;
pub mod transfer;
pub mod withdrawal;

pub use absence::AbsenceNoticeService;
pub use attendance::AttendanceService;
pub use auth::{AuthService, Claims};
pub use mailer::MailerService;
pub use notifier::NotificationService;
pub use passport::PassportService;
pub use reconciler::WithdrawalReconciler;
pub use transfer::TransferService;
pub use withdrawal::WithdrawalService;
