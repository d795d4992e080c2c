//! Configuration loading and data folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Data folder resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. `WORTSCHATZ_DATA` environment variable
/// 3. TOML config file (`data_folder` key)
/// 4. OS-dependent default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&Path>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("WORTSCHATZ_DATA") {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = config_file_path() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent default
    default_data_folder()
}

/// Locate the platform config file (`<config dir>/wortschatz/config.toml`)
fn config_file_path() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .map(|d| d.join("wortschatz").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("wortschatz"))
        .unwrap_or_else(|| PathBuf::from("/var/lib/wortschatz"))
}

/// Create the data folder if it does not exist
pub fn ensure_data_folder(folder: &Path) -> Result<()> {
    std::fs::create_dir_all(folder)?;
    Ok(())
}

/// Database file path inside the data folder
pub fn database_path(folder: &Path) -> PathBuf {
    folder.join("wortschatz.db")
}
