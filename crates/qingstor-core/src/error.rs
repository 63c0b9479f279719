//! Error types for the QingStor core crate.

/// Core error type for configuration and shared types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid zone identifier.
    #[error("invalid zone: {0:?} (must be a non-empty DNS label)")]
    InvalidZone(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
