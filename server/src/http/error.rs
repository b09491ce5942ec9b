use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use super::dto::ErrorResponse;
use crate::storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be read or parsed
    MalformedRequest(String),
    InvalidArgument(String),
    /// Anything reported by the store, passed through untouched
    Store(anyhow::Error),
}

impl ApiError {
    /// The single place where error kinds become status codes.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) | ApiError::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(err) => match err.downcast_ref::<StorageError>() {
                Some(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
                Some(StorageError::AlreadyExists(_)) => StatusCode::CONFLICT,
                Some(StorageError::InvalidName(_)) => StatusCode::BAD_REQUEST,
                None => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::MalformedRequest(_) => "Malformed Request",
            ApiError::InvalidArgument(_) => "Invalid Argument",
            ApiError::Store(err) => match err.downcast_ref::<StorageError>() {
                Some(StorageError::NotFound(_)) => "Not Found",
                Some(StorageError::AlreadyExists(_)) => "Already Exists",
                Some(StorageError::InvalidName(_)) => "Invalid Argument",
                None => "Storage Error",
            },
        }
    }

    fn details(&self) -> String {
        match self {
            ApiError::MalformedRequest(msg) | ApiError::InvalidArgument(msg) => msg.clone(),
            ApiError::Store(err) => format!("{err:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = self.details();

        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", details);
        } else {
            warn!(status = status.as_u16(), "{}", details);
        }

        let body = Json(ErrorResponse {
            error: self.label().to_string(),
            details: Some(details),
        });

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Store(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
