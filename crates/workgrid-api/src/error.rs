//! Maps domain `AppError` to the response envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use workgrid_core::error::{AppError, ErrorKind};

use crate::dto::ApiResponse;

/// Handler error. Wraps [`AppError`] so it can be turned into a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type returned by every handler.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if err.kind.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err.message, source = ?err.source, "Request failed");
        } else {
            tracing::debug!(kind = %err.kind, error = %err.message, details = ?err.details, "Request rejected");
        }

        let errors = match err.kind {
            ErrorKind::Validation if !err.details.is_empty() => Some(err.details.clone()),
            _ => None,
        };

        ApiResponse::error(status, err.public_message(), errors).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_envelope() {
        let err = AppError::validation_failed(vec!["phone: must be exactly 10 digits".into()]);
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["data"], serde_json::Value::Null);
        assert_eq!(body["errors"][0], "phone: must be exactly 10 digits");
    }

    #[tokio::test]
    async fn test_server_error_is_masked() {
        let response = ApiError(AppError::database("relation \"users\" does not exist")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }
}
