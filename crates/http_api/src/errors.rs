use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::task::JoinError;
use tracker_app::{ApiError, AppError};

/// JSON error body with the status it is sent under.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    body: ApiError,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>, code: Option<String>) -> Self {
        let body = ApiError {
            status: status.as_u16(),
            message: message.into(),
            code,
        };
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        let api_error = ApiError::from(err);
        let status =
            StatusCode::from_u16(api_error.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            body: api_error,
        }
    }
}

impl From<JoinError> for HttpError {
    fn from(err: JoinError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("background task failed: {err}"),
            Some("task_failed".to_string()),
        )
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.body.message, "request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = HttpError::from(AppError::InvalidInput("bad window".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code.as_deref(), Some("invalid_input"));
    }

    #[test]
    fn setup_failures_map_to_server_error() {
        let err = HttpError::from(AppError::Message("store unavailable".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.message, "store unavailable");
        assert!(err.body.code.is_none());
    }
}
