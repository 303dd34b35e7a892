use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracker_app::AppConfig;

use crate::dirs;

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub port: u16,
    pub claude_data_path: PathBuf,
    pub db_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub five_hour_limit_tokens: Option<u64>,
    pub weekly_opus_hours: u64,
    pub weekly_sonnet_hours: u64,
    pub opus_tokens_per_hour: u64,
    pub sonnet_tokens_per_hour: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self {
            port: DEFAULT_PORT,
            claude_data_path: app.claude_data_path,
            db_path: dirs::default_db_path(),
            five_hour_limit_tokens: app.five_hour_limit_tokens,
            weekly_opus_hours: app.weekly_opus_hours,
            weekly_sonnet_hours: app.weekly_sonnet_hours,
            opus_tokens_per_hour: app.opus_tokens_per_hour,
            sonnet_tokens_per_hour: app.sonnet_tokens_per_hour,
        }
    }
}

impl CliConfig {
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            claude_data_path: self.claude_data_path.clone(),
            db_path: self.db_path.clone(),
            five_hour_limit_tokens: self.five_hour_limit_tokens,
            weekly_opus_hours: self.weekly_opus_hours,
            weekly_sonnet_hours: self.weekly_sonnet_hours,
            opus_tokens_per_hour: self.opus_tokens_per_hour,
            sonnet_tokens_per_hour: self.sonnet_tokens_per_hour,
            ..AppConfig::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub file: PathBuf,
    pub created: bool,
}

pub fn load_or_create() -> Result<ConfigLoad, String> {
    load_or_create_in(&dirs::config_dir()?)
}

/// Reads `config.toml` from `dir`, writing one with defaults first if it does
/// not exist.
pub fn load_or_create_in(dir: &Path) -> Result<ConfigLoad, String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    let file = dir.join(CONFIG_FILE_NAME);

    if file.exists() {
        let contents = fs::read_to_string(&file)
            .map_err(|err| format!("read config {}: {}", file.display(), err))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|err| format!("parse config {}: {}", file.display(), err))?;
        return Ok(ConfigLoad {
            config,
            file,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&file, contents)
        .map_err(|err| format!("write config {}: {}", file.display(), err))?;

    Ok(ConfigLoad {
        config,
        file,
        created: true,
    })
}
