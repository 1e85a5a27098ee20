use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{AbsenceNoticeStatus, ReviewNoticeInput, SubmitNoticeInput};
use crate::database::repositories::AbsenceNoticeRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{AbsenceNoticeService, Claims};

/// Parent submits an absence/presence notice for one session.
pub async fn submit_notice(
    claims: Claims,
    service: web::Data<AbsenceNoticeService>,
    input: web::Json<SubmitNoticeInput>,
) -> Result<HttpResponse, AppError> {
    let guardian_id = claims.require_guardian()?;
    let notice = service.submit(guardian_id, input.into_inner()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(notice)))
}

#[derive(Debug, Deserialize)]
pub struct NoticeListQuery {
    pub status: Option<String>,
}

pub async fn list_notices(
    claims: Claims,
    repo: web::Data<AbsenceNoticeRepository>,
    query: web::Query<NoticeListQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may list notices".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<AbsenceNoticeStatus>()
                .map_err(AppError::BadRequest)?,
        ),
        None => None,
    };

    let notices = repo.list_for_club(club_id, status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(notices)))
}

/// Approve a notice, optionally opening an injury record alongside.
pub async fn approve_notice(
    claims: Claims,
    service: web::Data<AbsenceNoticeService>,
    path: web::Path<Uuid>,
    input: web::Json<ReviewNoticeInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may review notices".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let notice = service
        .approve(claims.user_id(), club_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(notice)))
}

pub async fn dismiss_notice(
    claims: Claims,
    service: web::Data<AbsenceNoticeService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may review notices".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let notice = service
        .dismiss(claims.user_id(), club_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(notice)))
}
