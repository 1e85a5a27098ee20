use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::database::models::CreateAthleteInput;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, PassportService};

/// Parent-initiated passport creation.
pub async fn create_athlete(
    claims: Claims,
    service: web::Data<PassportService>,
    input: web::Json<CreateAthleteInput>,
) -> Result<HttpResponse, AppError> {
    let guardian_id = claims.require_guardian()?;
    let athlete = service
        .create_passport(guardian_id, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(athlete)))
}

pub async fn get_athlete(
    claims: Claims,
    service: web::Data<PassportService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let guardian_id = claims.require_guardian()?;
    let athlete = service
        .get_owned_athlete(guardian_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(athlete)))
}

pub async fn list_athletes(
    claims: Claims,
    service: web::Data<PassportService>,
) -> Result<HttpResponse, AppError> {
    let guardian_id = claims.require_guardian()?;
    let athletes = service.list_owned_athletes(guardian_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(athletes)))
}
