use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum ClubRole {
        Admin => "admin",
        Coach => "coach",
        Parent => "parent",
    }
}

impl Default for ClubRole {
    fn default() -> Self {
        ClubRole::Parent
    }
}
