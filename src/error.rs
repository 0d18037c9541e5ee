//! Error types for hub2tea

use std::time::Duration;
use thiserror::Error;

/// Result type alias for hub2tea operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Migrate(#[from] MigrateError),

    #[error("Failed to read user list: {0}")]
    Roster(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Migration exceeded the run deadline of {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Whether this error is a "not found" answer from a remote platform.
    ///
    /// Lookups before a create treat this as the trigger for the create branch.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(ApiError::NotFound(_)))
    }
}

/// API-related errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check the access token.")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid duration '{0}'. Use values like 10m, 1h30m or 45s")]
    InvalidDuration(String),

    #[error("Invalid server URL '{0}': must start with http:// or https://")]
    InvalidServer(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Errors detected locally by the migration logic, before any network call.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Missing required migration parameters: {}", .0.join(", "))]
    MissingRepoFields(Vec<&'static str>),

    #[error("Permission '{0}' has no equivalent on the target platform")]
    UnsupportedPermission(String),

    #[error("Unknown permission '{0}'")]
    UnknownPermission(String),
}
