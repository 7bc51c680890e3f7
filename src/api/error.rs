// src/api/error.rs
use hyper::{Body, Response, StatusCode};
use serde::Serialize;

use super::json_response;
use crate::health::CheckError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Check(#[from] CheckError),

    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("No targets configured")]
    NoTargets,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    NotFound,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Check(_) | ApiError::InvalidBody(_) | ApiError::NoTargets => {
                StatusCode::BAD_REQUEST
            }
            ApiError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ApiError> for Response<Body> {
    fn from(err: ApiError) -> Self {
        if let ApiError::InvalidBody(detail) = &err {
            tracing::debug!("Rejected request body: {}", detail);
        }

        let body = ErrorBody {
            error: err.to_string(),
        };
        json_response(err.status_code(), &body)
    }
}
