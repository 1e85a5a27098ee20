use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::database::models::TerminateLinkInput;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::{Claims, WithdrawalService};

/// Parent starts the 24-hour cool-off.
pub async fn request_withdrawal(
    claims: Claims,
    service: web::Data<WithdrawalService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let guardian_id = claims.require_guardian()?;
    let player = service
        .request_withdrawal(guardian_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(player)))
}

/// Parent cancels while the reconciler has not completed the withdrawal.
pub async fn cancel_withdrawal(
    claims: Claims,
    service: web::Data<WithdrawalService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let guardian_id = claims.require_guardian()?;
    let player = service
        .cancel_withdrawal(guardian_id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(player)))
}

/// Club-initiated termination, immediate and without cool-off.
pub async fn terminate_link(
    claims: Claims,
    service: web::Data<WithdrawalService>,
    path: web::Path<Uuid>,
    input: web::Json<TerminateLinkInput>,
) -> Result<HttpResponse, AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only club admins may terminate memberships".to_string(),
        ));
    }
    let club_id = claims.require_club()?;

    let player = service
        .terminate_link(club_id, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(player)))
}
