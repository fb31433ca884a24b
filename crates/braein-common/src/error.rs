//! Error types shared across the site crates

use thiserror::Error;

/// Site-level error type
#[derive(Error, Debug)]
pub enum SiteError {
    /// Configuration holds values the site cannot use
    #[error("config error: {0}")]
    ConfigError(String),

    /// Configuration file is not valid JSON for [`SiteConfig`](crate::SiteConfig)
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Logging could not be installed
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// Result type for site operations
pub type SiteResult<T> = Result<T, SiteError>;
