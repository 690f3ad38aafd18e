//! JSON envelopes of the HTTP API and the mapping of service errors to
//! status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::library::MetadataError;
use crate::verse_chain::ChainError;

/// Success body: `{ "status": 200, "message": "ok", "payload": ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: u16,
    pub message: String,
    pub payload: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(payload: T) -> Self {
        ApiResponse {
            status: StatusCode::OK.as_u16(),
            message: "ok".to_string(),
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_a_number(param: &str) -> Self {
        Self::bad_request(format!("{} is not a number", param))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let status = if let Some(chain_error) = err.downcast_ref::<ChainError>() {
            match chain_error {
                ChainError::ReferenceNotFound { .. } => StatusCode::NOT_FOUND,
                ChainError::StorageUnavailable { .. } | ChainError::InvariantViolation { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else if err.downcast_ref::<MetadataError>().is_some() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            error!("Request failed: {:#}", err);
        } else {
            warn!("Request rejected: {:#}", err);
        }

        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: self.status.as_u16(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
