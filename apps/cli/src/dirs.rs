use std::env;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "tokenboard";
const DB_FILE_NAME: &str = "usage.db";

/// `$XDG_CONFIG_HOME/tokenboard`, falling back to `~/.config/tokenboard`.
pub fn config_dir() -> Result<PathBuf, String> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

/// `$XDG_DATA_HOME/tokenboard`, falling back to `~/.local/share/tokenboard`.
pub fn data_dir() -> Result<PathBuf, String> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

pub fn default_db_path() -> PathBuf {
    data_dir()
        .unwrap_or_else(|_| PathBuf::from("data"))
        .join(DB_FILE_NAME)
}

fn xdg_dir(var: &str, fallback: &[&str]) -> Result<PathBuf, String> {
    if let Some(base) = env::var_os(var).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(base).join(APP_DIR_NAME));
    }
    let home = env::var("HOME").map_err(|err| format!("resolve HOME: {err}"))?;
    let base = fallback
        .iter()
        .fold(PathBuf::from(home), |path, part| path.join(part));
    Ok(base.join(APP_DIR_NAME))
}
