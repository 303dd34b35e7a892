pub mod app;
pub mod config;
pub mod error;
pub mod quota;
pub mod services;
pub mod util;

pub use app::{AppState, setup_db};
pub use config::AppConfig;
pub use error::{ApiError, AppError, Result};
pub use quota::{CachedQuota, NoQuota, OAuthQuotaSource, QuotaSource};
pub use services::{
    AppServices, CalibrationService, ForecastService, HistoryService, IngestService,
    UsageService,
};
