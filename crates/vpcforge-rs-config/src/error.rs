//! Errors raised while loading or checking vpcforge config.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or path could not be read.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged JSON did not fit the config models.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A layer broke the schema; `path` is `<layer>:<dotted.key>`.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// A required setting is blank after merging and env overrides.
    #[error("invalid config: {0} cannot be empty")]
    EmptyField(&'static str),
    #[error("invalid config: server.api_key cannot be empty; omit it to disable the check")]
    EmptyApiKey,
    /// A count that must be at least one was zero.
    #[error("invalid config: {0} must be positive")]
    NotPositive(&'static str),
}
