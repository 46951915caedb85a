use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::models::Violation;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Eligibility check failed")]
    Eligibility(Vec<Violation>),

    #[error("No prizes left")]
    NoPrizesLeft,

    #[error("Prize was already won by a concurrent draw")]
    PrizeConflict,

    #[error("Timed out waiting for the prize row lock")]
    LockTimeout,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        // Eligibility 携带违规原因列表, 响应结构与其它错误不同, 单独处理
        if let AppError::Eligibility(violations) = self {
            let reasons: Vec<&'static str> = violations.iter().map(|v| v.token()).collect();
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": {
                    "code": "NOT_ELIGIBLE",
                    "reasons": reasons
                }
            }));
        }

        let (status_code, error_code, message) = match self {
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            // 预期业务结果, 不按故障记录日志
            AppError::NoPrizesLeft => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NO_PRIZES_LEFT",
                "No prizes left".to_string(),
            ),
            AppError::PrizeConflict => {
                // 正常情况下由重试循环消化, 走到这里说明重试已耗尽
                log::warn!("Prize allocation conflict surfaced to the client");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "PRIZE_CONFLICT",
                    "Prize was already won".to_string(),
                )
            }
            AppError::LockTimeout => {
                log::warn!("Prize lock acquisition timed out");
                (
                    actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                    "LOCK_TIMEOUT",
                    "Please retry shortly".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
