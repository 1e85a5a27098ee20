use actix_web::{
    dev::Payload, error::ErrorUnauthorized, web::Data, Error as ActixError, FromRequest,
    HttpRequest,
};
use anyhow::{anyhow, Result};
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{ClubRole, Guardian, User, UserInfo};
use crate::database::repositories::{GuardianRepository, UserRepository};

/// Authenticated caller context supplied by the identity layer: user id,
/// club scope, role, and the global guardian identity where one exists.
/// Ownership checks downstream never rely on the role alone.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub club_id: Option<Uuid>,
    pub role: Option<ClubRole>,
    pub guardian_id: Option<Uuid>,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(ClubRole::Admin)
    }

    pub fn is_coach(&self) -> bool {
        self.role == Some(ClubRole::Coach)
    }

    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.is_coach()
    }

    /// Club scope for staff operations.
    pub fn require_club(&self) -> Result<Uuid, crate::error::AppError> {
        self.club_id
            .ok_or_else(|| crate::error::AppError::Forbidden("No club scope".to_string()))
    }

    /// Guardian identity for parent operations.
    pub fn require_guardian(&self) -> Result<Uuid, crate::error::AppError> {
        self.guardian_id
            .ok_or_else(|| crate::error::AppError::Forbidden("Not a guardian account".to_string()))
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "));

        let (Some(token), Some(config)) = (token, req.app_data::<Data<Config>>()) else {
            return ready(Err(ErrorUnauthorized(
                "Missing or invalid authorization header",
            )));
        };

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(token_data) => ready(Ok(token_data.claims)),
            Err(_) => ready(Err(ErrorUnauthorized("Invalid token"))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: Option<UserInfo>,
}

#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    guardian_repository: GuardianRepository,
    config: Config,
}

impl AuthService {
    pub fn new(
        config: Config,
        user_repository: UserRepository,
        guardian_repository: GuardianRepository,
    ) -> Self {
        Self {
            user_repository,
            guardian_repository,
            config,
        }
    }

    /// Minimal token issuing surface. Club users log in against their
    /// club-local row; guardians against the global identity. Everything
    /// beyond this (registration, resets) lives outside this service.
    pub async fn login(&self, request: LoginInput) -> Result<AuthResponse> {
        if let Some(user) = self.user_repository.find_by_email(&request.email).await? {
            if verify(&request.password, &user.password_hash)? {
                let token = self.token_for_user(&user)?;
                return Ok(AuthResponse {
                    token,
                    user: Some(user.into()),
                });
            }
            return Err(anyhow!("Invalid email or password"));
        }

        let guardian = self
            .guardian_repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| anyhow!("Invalid email or password"))?;

        if !verify(&request.password, &guardian.password_hash)? {
            return Err(anyhow!("Invalid email or password"));
        }

        Ok(AuthResponse {
            token: self.token_for_guardian(&guardian)?,
            user: None,
        })
    }

    pub fn token_for_user(&self, user: &User) -> Result<String> {
        self.encode(Claims {
            sub: user.id,
            email: user.email.clone(),
            club_id: Some(user.club_id),
            role: Some(user.role),
            guardian_id: user.guardian_id,
            exp: self.expiry(),
        })
    }

    pub fn token_for_guardian(&self, guardian: &Guardian) -> Result<String> {
        self.encode(Claims {
            sub: guardian.id,
            email: guardian.email.clone(),
            club_id: None,
            role: None,
            guardian_id: Some(guardian.id),
            exp: self.expiry(),
        })
    }

    fn expiry(&self) -> usize {
        (Utc::now() + Duration::days(self.config.jwt_expiration_days)).timestamp() as usize
    }

    fn encode(&self, claims: Claims) -> Result<String> {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .map_err(|e| anyhow!("Failed to encode token: {}", e))
    }
}
