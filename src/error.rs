use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::constants::MSG_INVALID_ADDRESS;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid address format")]
    InvalidAddressFormat,

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Lookup already in progress")]
    LookupInProgress,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for errors raised by a call to the chain API.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, AppError::Fetch(_) | AppError::Timeout(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Fetch(err.to_string())
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidAddressFormat => (
                StatusCode::BAD_REQUEST,
                "INVALID_ADDRESS_FORMAT",
                MSG_INVALID_ADDRESS.to_string(),
            ),
            AppError::Fetch(ref msg) => (StatusCode::BAD_GATEWAY, "FETCH_ERROR", msg.clone()),
            AppError::Timeout(ref msg) => {
                (StatusCode::GATEWAY_TIMEOUT, "FETCH_TIMEOUT", msg.clone())
            }
            AppError::LookupInProgress => (
                StatusCode::CONFLICT,
                "LOOKUP_IN_PROGRESS",
                "A lookup for this address is already running".to_string(),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
