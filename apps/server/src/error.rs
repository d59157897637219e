use std::io::Error as IoError;

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use pingwatch_service::{ConfigError, StoreError};
use serde::Serialize;
use thiserror::Error;

/// Errors that stop the server from starting
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors returned by the control routes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no target with URL {0}")]
    TargetNotFound(String),
    #[error("target store task failed: {0}")]
    Blocking(#[from] BlockingError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::Invalid(_)) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::Duplicate { .. }) => StatusCode::CONFLICT,
            ApiError::TargetNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Persist(_)) | ApiError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody { error: self.to_string() })
    }
}
