pub mod absence;
pub mod athlete;
pub mod attendance;
pub mod club;
pub mod guardian;
pub mod injury;
pub mod mail;
pub mod membership;
pub mod notification;
pub mod player;
pub mod team;
pub mod training;
pub mod transfer;
pub mod user;

// Re-export all repositories for easy importing
pub use absence::AbsenceNoticeRepository;
pub use athlete::AthleteRepository;
pub use attendance::AttendanceRepository;
pub use club::ClubRepository;
pub use guardian::GuardianRepository;
pub use injury::InjuryRepository;
pub use mail::MailOutboxRepository;
pub use membership::MembershipRepository;
pub use notification::NotificationRepository;
pub use player::PlayerRepository;
pub use team::TeamRepository;
pub use training::TrainingRepository;
pub use transfer::TransferRequestRepository;
pub use user::UserRepository;
