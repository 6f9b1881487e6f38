use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::Frequency;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const CONFIG_DIR: &str = "config";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_ARTIFACTS_DIR: &str = "./artifacts";
const DEFAULT_FREQUENCY: &str = "W";
const DEFAULT_HORIZON: u32 = 8;
const DEFAULT_MAX_HORIZON: u32 = 520;
const DEFAULT_ALLOWED_ORIGINS: &str = "*";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration, read once at startup and shared through `AppState`.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Version string reported by `/health` and run results
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Directory holding the dataset CSVs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding the JSON artifacts
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    /// Frequency used when a run request does not name one ("W" or "M")
    #[serde(default = "default_frequency")]
    #[validate(custom = "validate_frequency")]
    pub default_frequency: String,

    /// Horizon used when a run request does not name one
    #[serde(default = "default_horizon")]
    #[validate(range(min = 1))]
    pub default_horizon: u32,

    /// Largest horizon a run request may ask for
    #[serde(default = "default_max_horizon")]
    #[validate(range(min = 1))]
    pub max_horizon: u32,

    /// Enables `POST /data/upload`
    #[serde(default = "default_true_bool")]
    pub enable_direct_upload: bool,

    /// CORS: comma-separated list of allowed origins, `*` for any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    /// Maximum request body size accepted by the upload route
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Creates a configuration rooted at the given directories, everything else defaulted.
    pub fn new(data_dir: impl Into<PathBuf>, artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_version: default_app_version(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            data_dir: data_dir.into(),
            artifacts_dir: artifacts_dir.into(),
            default_frequency: default_frequency(),
            default_horizon: default_horizon(),
            max_horizon: default_max_horizon(),
            enable_direct_upload: default_true_bool(),
            allowed_origins: default_allowed_origins(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// The configured default frequency. Validation guarantees it parses.
    pub fn frequency(&self) -> Frequency {
        self.default_frequency.parse().unwrap_or_default()
    }

    /// True when `*` appears among the configured origins
    pub fn allows_any_origin(&self) -> bool {
        self.origins().iter().any(|o| o == "*")
    }

    /// Configured CORS origins, trimmed, empties dropped
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Creates the data and artifact directories if they do not exist yet.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.artifacts_dir)
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.default_horizon > self.max_horizon {
            let mut err = ValidationError::new("default_horizon_exceeds_max");
            err.message = Some(
                format!(
                    "default_horizon ({}) must not exceed max_horizon ({})",
                    self.default_horizon, self.max_horizon
                )
                .into(),
            );
            errors.add("default_horizon", err);
        }

        if self.origins().is_empty() {
            let mut err = ValidationError::new("allowed_origins_empty");
            err.message =
                Some("Set APP__ALLOWED_ORIGINS to '*' or a comma-separated origin list".into());
            errors.add("allowed_origins", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACTS_DIR)
}

fn default_frequency() -> String {
    DEFAULT_FREQUENCY.to_string()
}

fn default_horizon() -> u32 {
    DEFAULT_HORIZON
}

fn default_max_horizon() -> u32 {
    DEFAULT_MAX_HORIZON
}

fn default_true_bool() -> bool {
    true
}

fn default_allowed_origins() -> String {
    DEFAULT_ALLOWED_ORIGINS.to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn validate_frequency(value: &str) -> Result<(), ValidationError> {
    value.parse::<Frequency>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("default_frequency");
        err.message = Some("Must be one of: W, M".into());
        err
    })
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("meal_forecast={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = fmt().with_env_filter(EnvFilter::new(filter_directive));
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Loads configuration from an explicit config directory and profile name.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let default_file = config_dir.join("default");
    let env_file = config_dir.join(run_env);

    let config = Config::builder()
        .set_default("environment", run_env)?
        .add_source(File::with_name(&default_file.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_file.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
