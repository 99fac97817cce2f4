//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::AppError;

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Failure from the tracking service
    App(AppError),
    /// Request body could not be parsed
    BadRequest(String),
    /// No route matched
    RouteNotFound,
    /// A handler panicked
    Panic,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::App(err) if err.is_input_error() => {
                (StatusCode::BAD_REQUEST, err.user_message())
            }
            ApiError::App(err @ AppError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.user_message())
            }
            ApiError::App(err) => {
                log::error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.user_message())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::RouteNotFound => (StatusCode::NOT_FOUND, "接口不存在".to_string()),
            ApiError::Panic => (
                StatusCode::INTERNAL_SERVER_ERROR,
                AppError::internal("panic").user_message(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorBody { error })).into_response()
    }
}
