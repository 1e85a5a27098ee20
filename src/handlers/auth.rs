use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::LoginInput;
use crate::AppState;

/// Issue a token for a club user or a guardian. Session management beyond
/// this lives outside the platform core.
pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    match state.auth_service.login(input.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(err) => {
            log::debug!("Login rejected: {}", err);
            Err(AppError::Unauthorized)
        }
    }
}
