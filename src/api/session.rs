use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::models::fields::validate_email;
use crate::services::session_service::SessionService;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct IssueTokenRequest {
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Session",
    request_body = IssueTokenRequest,
    responses(
        (status = 200, description = "Identity cookie set"),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn issue_token(
    sessions: web::Data<SessionService>,
    request: web::Json<IssueTokenRequest>,
) -> Result<HttpResponse, AppError> {
    validate_email(&request.email, "email")?;
    let email = request.email.trim();
    log::info!("🔐 POST /jwt - email: {}", email);

    let token = sessions.issue_token(email).map_err(AppError::TokenError)?;

    Ok(HttpResponse::Ok()
        .cookie(sessions.session_cookie(token))
        .json(serde_json::json!({ "success": true })))
}

#[utoipa::path(
    get,
    path = "/logout",
    tag = "Session",
    responses(
        (status = 200, description = "Identity cookie cleared")
    )
)]
pub async fn logout(sessions: web::Data<SessionService>) -> HttpResponse {
    log::info!("👋 GET /logout");

    HttpResponse::Ok()
        .cookie(sessions.cleared_cookie())
        .json(serde_json::json!({ "success": true }))
}
