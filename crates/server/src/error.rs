//! Application error handling

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use trials_core::{StudyDetailsOutput, TrialsError};

/// Error returned by the direct REST routes
#[derive(Debug)]
pub struct AppError(pub TrialsError);

impl From<TrialsError> for AppError {
    fn from(err: TrialsError) -> Self {
        AppError(err)
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            TrialsError::Validation(_) => StatusCode::BAD_REQUEST,
            TrialsError::NotFound(_) => StatusCode::NOT_FOUND,
            TrialsError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            TrialsError::Network(_) | TrialsError::Api { .. } => StatusCode::BAD_GATEWAY,
            TrialsError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after = match &self.0 {
            TrialsError::RateLimited { retry_after } => retry_after
                .as_deref()
                .and_then(|v| HeaderValue::from_str(v).ok()),
            _ => None,
        };

        let mut response = (status, Json(StudyDetailsOutput::failure(&self.0))).into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
