use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::AttendanceEntry;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{AttendanceService, Claims};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceInput {
    pub entries: Vec<AttendanceEntry>,
}

/// Coach or admin marks attendance for a session; unfit players are
/// excused automatically, whatever the payload says.
pub async fn mark_attendance(
    claims: Claims,
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
    input: web::Json<MarkAttendanceInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may mark attendance".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let saved = service
        .mark_attendance(
            club_id,
            claims.user_id(),
            path.into_inner(),
            input.into_inner().entries,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(saved)))
}

pub async fn list_attendance(
    claims: Claims,
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may view attendance".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let rows = service.list_attendance(club_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(rows)))
}

/// One-way lock once the session has ended.
pub async fn finalize_training(
    claims: Claims,
    service: web::Data<AttendanceService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may finalize trainings".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let training = service
        .finalize(club_id, claims.user_id(), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(training)))
}
