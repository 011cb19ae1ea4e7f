//! Configuration management

use clap::Parser;
use config::{Config as ConfigBuilder, ConfigError as BuilderError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API configuration: {0}")]
    InvalidApi(String),

    #[error("Invalid session configuration: {0}")]
    InvalidSession(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Backend REST surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `http://localhost:3001/api`
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

/// Session and token persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path of the persisted token document
    pub token_file: PathBuf,
    /// Whether the token cookie is marked secure (production deployments)
    pub cookie_secure: bool,
    /// Optional cookie max-age in seconds; absent means session-lifetime
    pub cookie_max_age: Option<u64>,
    /// Display name used for the synthetic offline user
    pub offline_user_name: String,
    /// Email used for the synthetic offline user
    pub offline_user_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();
        Self::load_from(cli_args)
    }

    fn load_from(cli_args: CliArgs) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // 1. Defaults (lowest priority)
        builder = builder
            .set_default("api.base_url", "http://localhost:3001/api")?
            .set_default("api.request_timeout", 30)?
            .set_default("session.token_file", "./data/token.json")?
            .set_default("session.cookie_secure", false)?
            .set_default("session.offline_user_name", "Admin (offline)")?
            .set_default("session.offline_user_email", "admin@example.com")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("logging.output", "stdout")?;

        // 2. Config file if specified (medium priority)
        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(config_path.display().to_string()));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // 3. Environment variables (higher priority)
        // Prefixed with ADMINLITE_ and using __ for nesting,
        // e.g. ADMINLITE_API__BASE_URL=http://localhost:3001/api
        builder = builder.add_source(
            Environment::with_prefix("ADMINLITE")
                .separator("__")
                .try_parsing(true),
        );

        // 4. CLI arguments (highest priority)
        if let Some(base_url) = &cli_args.base_url {
            builder = builder.set_override("api.base_url", base_url.clone())?;
        }
        if let Some(token_file) = &cli_args.token_file {
            builder =
                builder.set_override("session.token_file", token_file.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.is_empty() {
            return Err(ConfigError::InvalidApi("base_url must not be empty".into()));
        }
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::InvalidApi(format!(
                "base_url is not a valid URL: {}",
                self.api.base_url
            )));
        }
        if self.api.request_timeout == 0 {
            return Err(ConfigError::InvalidApi(
                "request_timeout must be greater than zero".into(),
            ));
        }
        if self.session.token_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidSession(
                "token_file must not be empty".into(),
            ));
        }
        match self.logging.format.as_str() {
            "json" | "text" => {}
            other => {
                return Err(ConfigError::InvalidLogging(format!(
                    "format must be 'json' or 'text', got '{}'",
                    other
                )))
            }
        }
        match self.logging.output.as_str() {
            "stdout" => {}
            "file" => {
                if self.logging.log_file.is_none() {
                    return Err(ConfigError::InvalidLogging(
                        "log_file must be set when output is 'file'".into(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::InvalidLogging(format!(
                    "output must be 'stdout' or 'file', got '{}'",
                    other
                )))
            }
        }
        Ok(())
    }
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "adminlite", about = "Content-management dashboard data-access layer")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Path of the persisted token document
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> Config {
        Config::load_from(CliArgs {
            config: None,
            base_url: None,
            token_file: None,
            log_level: None,
        })
        .expect("defaults must load")
    }

    #[test]
    fn defaults_are_valid() {
        let config = default_config();
        assert_eq!(config.api.base_url, "http://localhost:3001/api");
        assert_eq!(config.api.request_timeout, 30);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn cli_overrides_defaults() {
        let config = Config::load_from(CliArgs {
            config: None,
            base_url: Some("http://10.0.0.5:8080/api".into()),
            token_file: Some(PathBuf::from("/tmp/adminlite-token.json")),
            log_level: Some("debug".into()),
        })
        .expect("overrides must load");
        assert_eq!(config.api.base_url, "http://10.0.0.5:8080/api");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn rejects_invalid_base_url() {
        let mut config = default_config();
        config.api.base_url = "not a url".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidApi(_))
        ));
    }

    #[test]
    fn rejects_file_output_without_path() {
        let mut config = default_config();
        config.logging.output = "file".into();
        config.logging.log_file = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogging(_))
        ));
    }
}
