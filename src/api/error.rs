use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::TrackerError;

/// HTTP face of [`TrackerError`]. Bodies look like `{"detail": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub TrackerError);

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TrackerError::NotFound { .. } => StatusCode::NOT_FOUND,
            TrackerError::InsufficientSkillPoints { .. } | TrackerError::Invalid(_) => {
                StatusCode::BAD_REQUEST
            }
            TrackerError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            TrackerError::Database(_) | TrackerError::Serialization(_) | TrackerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        let mut response = (status, body).into_response();
        if let TrackerError::RateLimited { retry_after_secs } = self.0 {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
