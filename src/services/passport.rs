use anyhow::anyhow;
use rand::Rng;
use uuid::Uuid;

use crate::database::models::{Athlete, CreateAthleteInput};
use crate::database::repositories::AthleteRepository;
use crate::error::AppError;

/// Unambiguous alphabet for the shareable code: no 0/O or 1/I.
const CODE_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
const CODE_LENGTH: usize = 8;

/// Parent-initiated passport creation: the global athlete identity plus
/// its human-shareable code.
#[derive(Clone)]
pub struct PassportService {
    athlete_repository: AthleteRepository,
}

impl PassportService {
    pub fn new(athlete_repository: AthleteRepository) -> Self {
        Self { athlete_repository }
    }

    pub async fn create_passport(
        &self,
        guardian_id: Uuid,
        input: CreateAthleteInput,
    ) -> Result<Athlete, AppError> {
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(AppError::BadRequest("Athlete name is required".to_string()));
        }

        let code = self.unused_passport_code().await?;
        let athlete = self
            .athlete_repository
            .create(guardian_id, &code, input)
            .await?;

        Ok(athlete)
    }

    pub async fn get_owned_athlete(
        &self,
        guardian_id: Uuid,
        athlete_id: Uuid,
    ) -> Result<Athlete, AppError> {
        let athlete = self
            .athlete_repository
            .find_by_id(athlete_id)
            .await?
            .ok_or_else(|| AppError::not_found("Athlete"))?;

        if athlete.guardian_id != guardian_id {
            return Err(AppError::Forbidden("Not your athlete".to_string()));
        }

        Ok(athlete)
    }

    pub async fn list_owned_athletes(&self, guardian_id: Uuid) -> Result<Vec<Athlete>, AppError> {
        Ok(self.athlete_repository.list_for_guardian(guardian_id).await?)
    }

    /// Collisions over a 32^8 space are rare; a handful of retries is
    /// plenty before declaring something wrong with the generator.
    async fn unused_passport_code(&self) -> Result<String, AppError> {
        for _ in 0..5 {
            let code = generate_passport_code();
            if !self.athlete_repository.passport_code_exists(&code).await? {
                return Ok(code);
            }
        }
        Err(anyhow!("Could not allocate a unique passport code").into())
    }
}

pub fn generate_passport_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("ATH-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passport_codes_have_the_shareable_shape() {
        let code = generate_passport_code();
        assert_eq!(code.len(), 4 + CODE_LENGTH);
        assert!(code.starts_with("ATH-"));
        assert!(code[4..]
            .bytes()
            .all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn passport_codes_avoid_ambiguous_characters() {
        for _ in 0..100 {
            let code = generate_passport_code();
            assert!(!code[4..].contains(['0', 'O', '1', 'I']));
        }
    }
}
