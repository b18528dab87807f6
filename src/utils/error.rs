use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized access";

#[derive(Debug)]
pub enum AppError {
    DatabaseError(String),
    InvalidRequest(String),
    TokenError(String),
    Unauthorized,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::TokenError(msg) => write!(f, "Token error: {}", msg),
            AppError::Unauthorized => write!(f, "{}", UNAUTHORIZED_MESSAGE),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::TokenError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized => HttpResponse::Unauthorized().json(serde_json::json!({
                "message": UNAUTHORIZED_MESSAGE
            })),
            AppError::InvalidRequest(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": msg
            })),
            AppError::DatabaseError(msg) | AppError::TokenError(msg) => {
                log::error!("❌ {}", self);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "success": false,
                    "error": msg
                }))
            }
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        AppError::InvalidRequest(format!("Unsupported field value: {}", e))
    }
}

/// Parses a path identifier, rejecting anything that is not a 24-char hex ObjectId.
pub fn parse_object_id(raw: &str, what: &str) -> Result<mongodb::bson::oid::ObjectId, AppError> {
    mongodb::bson::oid::ObjectId::parse_str(raw)
        .map_err(|_| AppError::InvalidRequest(format!("Invalid {} ID", what)))
}
