//! Load and validate server configuration.
use std::{env, path::PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod provider;
pub mod telemetry;

pub use provider::{
    parse_provider_section, ProviderConfig, RawProviderSection, BASE_URL_ENV_OVERRIDE,
    DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, MODEL_ENV_OVERRIDE,
};

pub const CONFIG_ENV_KEY: &str = "REFINE_PROMPT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level configuration container.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub provider: ProviderConfig,
    pub source_path: PathBuf,
    /// False when no file existed and only defaults/environment were applied.
    pub file_found: bool,
}

#[derive(Debug, Deserialize)]
struct RawServerConfig {
    provider: Option<RawProviderSection>,
}

impl ServerConfig {
    /// Load configuration from a specific path, reading secrets from the process environment.
    ///
    /// When `required` is false a missing file falls back to built-in defaults.
    pub fn load_from_path(path: PathBuf, required: bool) -> Result<Self, ConfigError> {
        Self::load_with_lookup(path, required, &|key| env::var(key).ok())
    }

    /// Load configuration using an explicit environment lookup.
    pub fn load_with_lookup(
        path: PathBuf,
        required: bool,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        info!(
            target: "refine_prompt::config",
            path = %path.display(),
            required,
            "Starting configuration load"
        );

        let file_found = path.is_file();
        let source = config::File::from(path.as_path())
            .format(config::FileFormat::Toml)
            .required(required);
        let document = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|err| {
                let error = ConfigError::from_read_error(path.clone(), err);
                error!(
                    target: "refine_prompt::config",
                    path = %path.display(),
                    reason = %error,
                    "Failed to read configuration file"
                );
                error
            })?;

        let raw: RawServerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "refine_prompt::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let provider = parse_provider_section(raw.provider, &path, lookup).map_err(|err| {
            error!(
                target: "refine_prompt::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        let config = Self {
            provider,
            source_path: path,
            file_found,
        };
        telemetry::log_loaded(&config);
        Ok(config)
    }
}
