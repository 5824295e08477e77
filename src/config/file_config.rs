//! Configuration file discovery and persistence.
//!
//! # Configuration File Format
//!
//! ```toml
//! endpoint = "http://export.arxiv.org/api/query"
//!
//! [http]
//! user_agent = "garx/0.1.0"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [search]
//! max_results = 20
//! sort_by = "submittedDate"
//! sort_order = "descending"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! Any key can be overridden from the environment with a `GARX_` prefix and
//! `__` between sections, e.g. `GARX_SEARCH__MAX_RESULTS=50`.

use std::path::{Path, PathBuf};

use super::Config;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "garx.toml";

/// `<config dir>/garx/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("garx").join("config.toml"))
}

/// First existing config file: `./garx.toml`, then [`default_config_path`]
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|path| path.is_file())
}

/// Write `config` as TOML, creating parent directories as needed
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigFileError> {
    let content = config.to_toml()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }

    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
