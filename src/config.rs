use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::coordinate::{validate_latitude, validate_longitude, Coordinate};
use crate::platform::Accuracy;
use crate::services::{
    location_provider::DEFAULT_FALLBACK, MockPlaceGenerator, PlaceCatalog, ProviderOptions,
};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_ACCURACY: &str = "high";
const CONFIG_DIR: &str = "config";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
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

    /// Latitude reported when no live fix can be obtained
    #[serde(default = "default_fallback_latitude")]
    #[validate(custom = "validate_latitude")]
    pub fallback_latitude: f64,

    /// Longitude reported when no live fix can be obtained
    #[serde(default = "default_fallback_longitude")]
    #[validate(custom = "validate_longitude")]
    pub fallback_longitude: f64,

    /// Requested fix quality: "high", "balanced" or "low_power"
    #[serde(default = "default_accuracy")]
    #[validate(custom = "validate_accuracy")]
    pub accuracy: String,

    /// Open the system location settings when location services are off
    #[serde(default = "default_true_bool")]
    pub open_settings_when_disabled: bool,

    /// Optional JSON file replacing the built-in place catalog
    #[serde(default)]
    pub place_catalog_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            accuracy: default_accuracy(),
            open_settings_when_disabled: true,
            place_catalog_path: None,
        }
    }
}

impl AppConfig {
    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn fallback_coordinate(&self) -> Result<Coordinate, crate::errors::ServiceError> {
        Coordinate::new(self.fallback_latitude, self.fallback_longitude)
    }

    pub fn accuracy(&self) -> Result<Accuracy, crate::errors::ServiceError> {
        self.accuracy
            .parse()
            .map_err(crate::errors::ServiceError::Config)
    }

    /// Provider options derived from this configuration
    pub fn provider_options(&self) -> Result<ProviderOptions, crate::errors::ServiceError> {
        Ok(ProviderOptions {
            fallback: self.fallback_coordinate()?,
            accuracy: self.accuracy()?,
            open_settings_when_disabled: self.open_settings_when_disabled,
        })
    }

    /// Builds the place generator, loading the catalog file when one is configured.
    pub fn place_generator(&self) -> Result<MockPlaceGenerator, crate::errors::ServiceError> {
        let catalog = match &self.place_catalog_path {
            Some(path) => PlaceCatalog::from_json_file(path)?,
            None => PlaceCatalog::default(),
        };
        Ok(MockPlaceGenerator::new(catalog))
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_accuracy() -> String {
    DEFAULT_ACCURACY.to_string()
}

fn default_fallback_latitude() -> f64 {
    DEFAULT_FALLBACK.latitude
}

fn default_fallback_longitude() -> f64 {
    DEFAULT_FALLBACK.longitude
}

fn default_true_bool() -> bool {
    true
}

/// Validates log level values
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

fn validate_accuracy(value: &str) -> Result<(), ValidationError> {
    value.parse::<Accuracy>().map(|_| ()).map_err(|message| {
        let mut err = ValidationError::new("accuracy");
        err.message = Some(message.into());
        err
    })
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("nearby_places={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    // stdout carries command output; logs go to stderr
    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .with_writer(std::io::stderr)
            .try_init();
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
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    load_profile(config_dir, &run_env)
}

/// Loads the layers for an explicit profile name.
pub fn load_profile(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("fallback_latitude", DEFAULT_FALLBACK.latitude)?
        .set_default("fallback_longitude", DEFAULT_FALLBACK.longitude)?
        .set_default("accuracy", DEFAULT_ACCURACY)?
        .set_default("open_settings_when_disabled", true)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
