pub mod absences;
pub mod athletes;
pub mod auth;
pub mod shared;
pub mod trainings;
pub mod transfers;
pub mod withdrawals;
