use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success half of the response envelope; [`ApiError`](super::error::ApiError)
/// is the other half. Every handler answers with one of the two.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
        }
    }

    pub fn created(body: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Some(body),
        }
    }
}

impl ApiResponse<()> {
    /// 200 with no body
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}
