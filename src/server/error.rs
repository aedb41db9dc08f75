//! HTTP mapping for handler failures.
//!
//! Every failure leaves as `{"error": "<message>"}`. Internal failures are
//! logged here and redacted before they reach the client.

use crate::model::{AuthError, ImageError, StorageError};
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Not found")]
    NotFound,
    /// Server-side setup problem whose message is safe to show.
    #[error("{0}")]
    Misconfigured(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Misconfigured(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            Self::Internal(detail) => {
                error!("Request failed: {}", detail);
                "Internal server error".to_string()
            }
            Self::Misconfigured(detail) => {
                error!("{}", detail);
                detail.clone()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { error: &message })
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => Self::Misconfigured(err.to_string()),
            AuthError::InvalidPassword | AuthError::MissingToken | AuthError::InvalidToken => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::Hash(_) | AuthError::Token(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InvalidFilename(_) | ImageError::Image(_) => {
                warn!("Rejected image request: {}", err);
                Self::BadRequest(err.to_string())
            }
            ImageError::Io(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for ApiError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        Self::BadRequest(format!("malformed upload: {err}"))
    }
}
