pub mod absence;
pub mod athlete;
pub mod club;
pub mod guardian;
pub mod injury;
pub(crate) mod macros;
pub mod mail;
pub mod notification;
pub mod player;
pub mod team;
pub mod training;
pub mod transfer;
pub mod user;

// Re-export all models for easy importing
pub use absence::*;
pub use athlete::*;
pub use club::*;
pub use guardian::*;
pub use injury::*;
pub use mail::*;
pub use notification::*;
pub use player::*;
pub use team::*;
pub use training::*;
pub use transfer::*;
pub use user::*;
