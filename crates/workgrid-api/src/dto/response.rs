//! The response envelope shared by every endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// `{success, data, message, statusCode, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data; `null` on errors and bodiless successes.
    pub data: Option<T>,
    /// Human-readable message.
    pub message: String,
    /// HTTP status, repeated in the body.
    pub status_code: u16,
    /// Field-level validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    /// 200 with data.
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, "OK", Some(data))
    }

    /// 201 with the created resource.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    /// 200 with data and a custom message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: status.is_success(),
            data,
            message: message.into(),
            status_code: status.as_u16(),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// 200 with a message and no data.
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }

    /// An error envelope.
    pub fn error(status: StatusCode, message: impl Into<String>, errors: Option<Vec<String>>) -> Self {
        Self {
            errors,
            ..Self::with_status(status, message, None)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Number of rows a batch operation changed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub count: u64,
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
