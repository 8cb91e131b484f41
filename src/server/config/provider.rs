use std::{fmt, path::Path};

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub const MODEL_ENV_OVERRIDE: &str = "REFINE_PROMPT_MODEL";
pub const BASE_URL_ENV_OVERRIDE: &str = "REFINE_PROMPT_BASE_URL";

/// Completion provider settings.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Name of the environment variable the credential is read from.
    pub api_key_env: String,
    /// Resolved credential; `None` is reported per call, not at startup.
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawProviderSection {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub api_key_env: Option<String>,
    pub api_key: Option<String>,
}

pub fn parse_provider_section(
    raw: Option<RawProviderSection>,
    path: &Path,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<ProviderConfig, ConfigError> {
    let raw = raw.unwrap_or_default();

    let base_url = non_blank(lookup(BASE_URL_ENV_OVERRIDE))
        .or(non_blank(raw.base_url))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    validate_base_url(&base_url, path)?;

    let model = non_blank(lookup(MODEL_ENV_OVERRIDE))
        .or(non_blank(raw.model))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let temperature = raw.temperature.unwrap_or(DEFAULT_TEMPERATURE);
    validate_temperature(temperature, path)?;

    let max_tokens = raw.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    if max_tokens == 0 {
        return Err(invalid(path, "provider.max_tokens", "Use a value greater than 0"));
    }

    let timeout_secs = raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(invalid(
            path,
            "provider.timeout_secs",
            "Use a value greater than 0",
        ));
    }

    let api_key_env =
        non_blank(raw.api_key_env).unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
    let api_key = non_blank(raw.api_key).or_else(|| non_blank(lookup(&api_key_env)));

    Ok(ProviderConfig {
        base_url,
        model,
        temperature,
        max_tokens,
        timeout_secs,
        api_key_env,
        api_key,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_base_url(base_url: &str, path: &Path) -> Result<(), ConfigError> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        return Ok(());
    }
    Err(invalid(
        path,
        "provider.base_url",
        "Use an absolute http:// or https:// URL",
    ))
}

fn validate_temperature(temperature: f64, path: &Path) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&temperature) {
        return Ok(());
    }
    Err(invalid(
        path,
        "provider.temperature",
        "Use a value in the range 0.0-1.0",
    ))
}

fn invalid(path: &Path, field: &'static str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_path_buf(),
        field,
        message: message.into(),
    }
}
