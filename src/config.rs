//! Configuration System
//!
//! Loads configuration from a TOML file with environment variable overrides.
//! The resulting `Config` is built once at startup and passed explicitly to
//! the store, the report engine and the API.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter, Layer,
    Registry,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("sawdesk").join("sawdesk.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./sawdesk_data/sawdesk.db".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl StoreConfig {
    /// Database path with a leading `~/` expanded to the home directory
    pub fn resolved_path(&self) -> PathBuf {
        match (self.database_path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.database_path),
        }
    }
}

/// Deployment environment
///
/// Development responses carry an internal `error` detail field. Anything
/// not explicitly marked as development runs as production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub environment: Environment,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            environment: Environment::default(),
        }
    }
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn init_subscriber(&self) -> Result<(), TryInitError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", self.level)));

        let layer: Box<dyn Layer<Registry> + Send + Sync> = if self.is_json() {
            fmt::layer().json().with_filter(filter).boxed()
        } else {
            fmt::layer().with_filter(filter).boxed()
        };

        tracing_subscriber::registry().with(layer).try_init()
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load from the default locations, falling back to defaults plus
    /// environment overrides when no file exists
    ///
    /// Returns the file that was loaded, if any.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::load_first(&default_config_paths())
    }

    /// Load the first existing file in `paths`
    ///
    /// A file that exists but cannot be read or parsed is an error. Later
    /// paths are not tried.
    pub fn load_first(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => Ok((Self::load_with_env(path)?, Some(path.clone()))),
            None => Ok((Self::from_env()?, None)),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("SAWDESK_DB_PATH") {
            self.store.database_path = path;
        }

        if let Some(host) = var("SAWDESK_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("SAWDESK_API_PORT") {
            self.api.port = port.parse().map_err(|_| ConfigError::Override {
                key: "SAWDESK_API_PORT",
                value: port.clone(),
            })?;
        }
        if let Some(env) = var("SAWDESK_ENV") {
            self.api.environment = env.parse().map_err(|_| ConfigError::Override {
                key: "SAWDESK_ENV",
                value: env.clone(),
            })?;
        }

        if let Some(level) = var("SAWDESK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SAWDESK_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }
}

/// Config file locations, in lookup order
pub fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("sawdesk").join("config.toml")),
        Some(PathBuf::from("/etc/sawdesk/config.toml")),
        Some(PathBuf::from("./config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {key}: {value:?}")]
    Override { key: &'static str, value: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Sawdesk Configuration
#
# Environment variables override these settings:
# - SAWDESK_DB_PATH
# - SAWDESK_API_HOST
# - SAWDESK_API_PORT
# - SAWDESK_ENV
# - SAWDESK_LOG_LEVEL
# - SAWDESK_LOG_FORMAT

[store]
# SQLite database holding clients, blades and sharpening records
database_path = "~/.local/share/sawdesk/sawdesk.db"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# development adds internal error details to error responses
environment = "production"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.api.environment, Environment::Production);
        assert!(config.api.cors_origins.is_empty());
        assert_eq!(config.logging.format, "pretty");
        assert!(config.store.database_path.ends_with("sawdesk.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = 9000\nenvironment = \"production\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(!config.api.environment.is_development());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[api\nport = ").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SAWDESK_DB_PATH", "/tmp/shop.db"),
            ("SAWDESK_API_PORT", "9100"),
            ("SAWDESK_ENV", "production"),
            ("SAWDESK_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.store.database_path, "/tmp/shop.db");
        assert_eq!(config.api.port, 9100);
        assert_eq!(config.api.environment, Environment::Production);
        assert!(config.logging.is_json());
        assert_eq!(config.api.bind_addr(), "0.0.0.0:9100");
    }

    #[test]
    fn test_resolved_path() {
        let config = StoreConfig {
            database_path: "/var/lib/sawdesk/shop.db".to_string(),
        };
        assert_eq!(config.resolved_path(), PathBuf::from("/var/lib/sawdesk/shop.db"));

        let config = StoreConfig {
            database_path: "~/shop.db".to_string(),
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.resolved_path(), home.join("shop.db"));
        }
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|k| match k {
                "SAWDESK_API_PORT" => Some("not-a-port".to_string()),
                _ => None,
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Override { key: "SAWDESK_API_PORT", .. }));

        let err = config
            .apply_overrides(|k| match k {
                "SAWDESK_ENV" => Some("staging".to_string()),
                _ => None,
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Override { key: "SAWDESK_ENV", .. }));
        assert_eq!(config.api.environment, Environment::Production);
    }

    #[test]
    fn test_environment_defaults_to_production() {
        assert_eq!(Config::default().api.environment, Environment::Production);

        let config = Config::parse("[api]\nport = 9000\n").unwrap();
        assert_eq!(config.api.environment, Environment::Production);
        assert!(!config.api.environment.is_development());

        let config = Config::parse("[api]\nenvironment = \"development\"\n").unwrap();
        assert!(config.api.environment.is_development());
    }

    #[test]
    fn test_load_first_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let broken = dir.path().join("broken.toml");
        let valid = dir.path().join("valid.toml");
        std::fs::write(&broken, "[api]\nenvironment = \"production\"\nport = \"oops\"\n").unwrap();
        std::fs::write(&valid, "[api]\nport = 9000\n").unwrap();

        let result = Config::load_first(&[missing.clone(), broken.clone(), valid.clone()]);
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, broken),
            other => panic!("expected parse error, got {:?}", other.map(|(c, _)| c)),
        }

        let (config, source) = Config::load_first(&[missing.clone(), valid.clone()]).unwrap();
        assert_eq!(source, Some(valid));
        assert_eq!(config.api.port, 9000);

        let (_, source) = Config::load_first(&[missing]).unwrap();
        assert!(source.is_none());
    }
}
