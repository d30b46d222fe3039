//! Configuration errors and validation

use std::time::Duration;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("Invalid broker URL {url}: {reason}")]
    InvalidBrokerUrl { url: String, reason: String },

    #[error("Client certificate and key must be configured together (missing {0})")]
    IncompleteCredentials(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Upper bound accepted for the header timeout.
pub const MAX_HEADER_TIMEOUT: Duration = Duration::from_secs(3600);

/// Validate a timeout duration
///
/// # Errors
///
/// Returns `ConfigError::InvalidTimeout` if the timeout exceeds one hour.
/// A zero timeout is accepted and means "use the default".
pub fn validate_header_timeout(timeout: Duration) -> ConfigResult<()> {
    if timeout > MAX_HEADER_TIMEOUT {
        return Err(ConfigError::InvalidTimeout(format!(
            "header timeout must not exceed {}s",
            MAX_HEADER_TIMEOUT.as_secs()
        )));
    }
    Ok(())
}
