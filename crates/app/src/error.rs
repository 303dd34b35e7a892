use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("store error: {0}")]
    Db(#[from] tracker_db::DbError),
    #[error("ingest error: {0}")]
    Ingest(#[from] ingest::IngestError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Error body returned by the HTTP layer.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match err {
            AppError::InvalidInput(_) => (400, Some("invalid_input")),
            AppError::Db(_) => (500, Some("store_error")),
            AppError::Ingest(_) => (500, Some("ingest_error")),
            AppError::Message(_) => (500, None),
        };
        Self {
            status,
            message: err.to_string(),
            code: code.map(str::to_string),
        }
    }
}
