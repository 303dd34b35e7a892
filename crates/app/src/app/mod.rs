use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracker_db::Db;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::quota::{CachedQuota, OAuthQuotaSource, QuotaSource};
use crate::services::AppServices;

/// Application state shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl AppState {
    /// State backed by the OAuth quota endpoint, using the credentials file
    /// under the configured data directory.
    pub fn new(config: AppConfig) -> Self {
        let source = OAuthQuotaSource::new(config.credentials_path(), config.quota_timeout());
        Self::with_quota_source(config, Arc::new(source))
    }

    pub fn with_quota_source(config: AppConfig, source: Arc<dyn QuotaSource>) -> Self {
        let quota = Arc::new(CachedQuota::new(source, config.quota_cache_ttl()));
        let services = AppServices::new(&config, quota);
        Self {
            config: Arc::new(config),
            services,
        }
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}

/// Creates the store's parent directory and applies pending migrations.
pub fn setup_db(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            AppError::Message(format!("create db dir {}: {err}", parent.display()))
        })?;
    }
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
