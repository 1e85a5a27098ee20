use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global athlete passport. `current_club_id` is NULL while the athlete is
/// a free agent; it is non-null exactly when one player row for this
/// athlete is active or pending withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Athlete {
    pub id: Uuid,
    pub passport_code: String,
    pub guardian_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub national_id: Option<String>,
    pub national_id_country: Option<String>,
    pub medical_notes: Option<String>,
    pub current_club_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAthleteInput {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub national_id: Option<String>,
    pub national_id_country: Option<String>,
    pub medical_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteSearchQuery {
    pub passport_code: Option<String>,
    pub national_id: Option<String>,
    pub national_id_country: Option<String>,
}

/// Non-sensitive confirmation view returned by transfer search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteMatch {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub has_club: bool,
}

impl From<&Athlete> for AthleteMatch {
    fn from(athlete: &Athlete) -> Self {
        Self {
            first_name: athlete.first_name.clone(),
            last_name: athlete.last_name.clone(),
            birth_date: athlete.birth_date,
            has_club: athlete.current_club_id.is_some(),
        }
    }
}
