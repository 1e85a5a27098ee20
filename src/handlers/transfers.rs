use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{AthleteSearchQuery, RequestTransferInput, TransferRequestStatus};
use crate::database::repositories::TransferRequestRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, TransferService};

/// Club-side search for a free agent by passport code or national id.
pub async fn search_athlete(
    claims: Claims,
    service: web::Data<TransferService>,
    query: web::Query<AthleteSearchQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may search athletes".to_string(),
        ));
    }
    claims.require_club()?;

    let matched = service.search(&query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(matched)))
}

pub async fn request_transfer(
    claims: Claims,
    service: web::Data<TransferService>,
    input: web::Json<RequestTransferInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only club admins may request transfers".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let request = service
        .request_transfer(club_id, &input.passport_code)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

#[derive(Debug, Deserialize)]
pub struct TransferListQuery {
    pub status: Option<String>,
}

pub async fn list_transfer_requests(
    claims: Claims,
    repo: web::Data<TransferRequestRepository>,
    query: web::Query<TransferListQuery>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only club staff may list transfer requests".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<TransferRequestStatus>()
                .map_err(AppError::BadRequest)?,
        ),
        None => None,
    };

    let requests = repo.list_for_club(club_id, status).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Guardian-side approval of a pending request.
pub async fn approve_transfer(
    claims: Claims,
    service: web::Data<TransferService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let guardian_id = claims.require_guardian()?;
    let player = service
        .approve_transfer(guardian_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(player)))
}
