use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::upload::UploadError;

/// An error rendered as `{"error": message}` with a matching status code.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let message = err.to_string();
        match err {
            UploadError::MissingFile => Self::bad_request(message),
            UploadError::TooLarge { .. } => Self::payload_too_large(message),
            UploadError::Read(_) => Self::internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_single_error_field() {
        let (status, json) = render(AppError::bad_request("Invalid request JSON")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": "Invalid request JSON" }));
    }

    #[tokio::test]
    async fn upload_errors_map_to_statuses() {
        let missing: AppError = UploadError::MissingFile.into();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let (status, json) = render(UploadError::TooLarge { limit: 10 }.into()).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"], "File too large (limit 10 bytes)");
    }

    #[tokio::test]
    async fn internal_keeps_message_verbatim() {
        let (status, json) =
            render(AppError::internal("completion provider returned 401: bad key")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "completion provider returned 401: bad key");
    }
}
