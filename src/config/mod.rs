//! Configuration management.

mod file_config;

pub use file_config::{default_config_path, find_config_file, save_config, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::client::ARXIV_API_URL;
use crate::models::{SortBy, SortOrder};
use crate::utils::DEFAULT_USER_AGENT;

/// Environment variable prefix, e.g. `GARX_HTTP__TIMEOUT_SECS=20`
pub const ENV_PREFIX: &str = "GARX";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// arXiv query endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Defaults the command line applies to every search
    #[serde(default)]
    pub search: SearchDefaults,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            http: HttpConfig::default(),
            search: SearchDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Render as TOML, e.g. for a starter config file
    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }
}

fn default_endpoint() -> String {
    ARXIV_API_URL.to_string()
}

/// HTTP transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Overall request timeout. Unset means no limit beyond the caller's context.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

/// Search defaults. Only the command line reads these; the client itself
/// sends nothing the caller did not ask for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDefaults {
    #[serde(default)]
    pub max_results: Option<i64>,

    #[serde(default)]
    pub sort_by: Option<SortBy>,

    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` for structured output, anything else for plain text
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a file, with `GARX_*` environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Configuration from environment overrides and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://export.arxiv.org/api/query");
        assert_eq!(config.http.timeout_secs, None);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert!(config.http.user_agent.starts_with("garx/"));
        assert_eq!(config.search, SearchDefaults::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garx.toml");

        let toml_content = r#"
endpoint = "http://localhost:8080/api/query"

[http]
user_agent = "test-agent/1.0"
timeout_secs = 15

[search]
max_results = 25
sort_by = "submittedDate"
sort_order = "descending"

[logging]
level = "debug"
format = "json"
"#;

        let mut file = File::create(&path).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/api/query");
        assert_eq!(config.http.user_agent, "test-agent/1.0");
        assert_eq!(config.http.timeout_secs, Some(15));
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.search.max_results, Some(25));
        assert_eq!(config.search.sort_by, Some(SortBy::SubmittedDate));
        assert_eq!(config.search.sort_order, Some(SortOrder::Descending));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garx.toml");
        std::fs::write(&path, "[search]\nmax_results = 5\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.endpoint, ARXIV_API_URL);
        assert_eq!(config.search.max_results, Some(5));
        assert_eq!(config.search.sort_by, None);
    }

    #[test]
    fn test_load_config_nonexistent() {
        let result = load_config(Path::new("/nonexistent/garx.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_to_toml_round_trip() {
        let mut config = Config::default();
        config.search.sort_by = Some(SortBy::LastUpdatedDate);
        config.http.timeout_secs = Some(30);

        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("sort_by = \"lastUpdatedDate\""));

        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
