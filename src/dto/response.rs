use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;

/// Success envelope: `{ "success": true, "data": ..., "message"?: ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse { success: true, data: Some(data), message: None, status: StatusCode::OK }
    }

    pub fn created(data: T) -> Self {
        ApiResponse { status: StatusCode::CREATED, ..Self::ok(data) }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse { success: true, data: None, message: Some(message.into()), status: StatusCode::OK }
    }

    pub fn created_message(message: impl Into<String>) -> Self {
        ApiResponse { status: StatusCode::CREATED, ..Self::message(message) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
