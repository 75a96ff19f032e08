use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

use crate::entities::EventStatus;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: EventStatus, to: EventStatus },

    #[error("Event not found")]
    EventNotFound,

    #[error("Event is in {status} status, expected {expected}")]
    InvalidState {
        status: EventStatus,
        expected: EventStatus,
    },

    #[error("No eligible participants remaining")]
    NoEligibleParticipants,

    #[error("Concurrent modification detected, please retry")]
    TransientConflict,

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// 对外暴露的错误码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::EventNotFound => "EVENT_NOT_FOUND",
            AppError::InvalidState { .. } => "INVALID_STATE",
            AppError::NoEligibleParticipants => "NO_ELIGIBLE_PARTICIPANTS",
            AppError::TransientConflict => "TRANSIENT_CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidTransition { .. }
            | AppError::InvalidState { .. }
            | AppError::NoEligibleParticipants
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EventNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TransientConflict => StatusCode::CONFLICT,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            AppError::InternalError(_) => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                "Invalid or expired token".to_string()
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                msg.clone()
            }
            AppError::TransientConflict => {
                log::warn!("Transient conflict surfaced to caller");
                self.to_string()
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::Forbidden(msg) => {
                log::warn!("Forbidden: {msg}");
                msg.clone()
            }
            AppError::NotFound(msg) => msg.clone(),
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_client_statuses() {
        let invalid = AppError::InvalidTransition {
            from: EventStatus::Init,
            to: EventStatus::Drawing,
        };
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "Invalid status transition: init -> drawing");

        assert_eq!(AppError::EventNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::NoEligibleParticipants.code(),
            "NO_ELIGIBLE_PARTICIPANTS"
        );
        assert_eq!(
            AppError::TransientConflict.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_forbidden_renders_403() {
        let err = AppError::Forbidden("Cannot delete your own account".into());
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = AppError::DatabaseError(DbErr::Custom("secret detail".into()));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
