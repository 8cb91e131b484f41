use std::path::PathBuf;

use config::ConfigError as ConfigLoaderError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures raised while handling a single tool call.
///
/// Every variant is converted into an `isError` tool result by the dispatcher;
/// none of them terminates the server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefineError {
    #[error("{message}")]
    InvalidArguments { message: String },
    #[error("{env_var} environment variable is not set.")]
    MissingCredential { env_var: String },
    #[error("Failed to get string output from the language model: {reason}")]
    UnexpectedOutputShape { reason: String },
    #[error("Completion provider request failed: {reason}")]
    ProviderInvocationFailed { reason: String },
    #[error("Completion provider did not respond within {duration_secs} seconds")]
    Timeout { duration_secs: u64 },
    #[error("Unknown tool called: {name}")]
    UnknownTool { name: String },
}

impl RefineError {
    /// Stable machine-readable code used in logs.
    pub const fn code(&self) -> &'static str {
        match self {
            RefineError::InvalidArguments { .. } => "invalid_arguments",
            RefineError::MissingCredential { .. } => "missing_credential",
            RefineError::UnexpectedOutputShape { .. } => "unexpected_output_shape",
            RefineError::ProviderInvocationFailed { .. } => "provider_failed",
            RefineError::Timeout { .. } => "timeout",
            RefineError::UnknownTool { .. } => "unknown_tool",
        }
    }

    /// Whether the same call may succeed if the client simply tries again.
    pub const fn retryable(&self) -> bool {
        matches!(
            self,
            RefineError::ProviderInvocationFailed { .. } | RefineError::Timeout { .. }
        )
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        RefineError::InvalidArguments {
            message: message.into(),
        }
    }
}
