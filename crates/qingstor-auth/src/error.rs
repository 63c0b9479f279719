//! Error types for credential resolution and request signing.

/// Errors that can occur while resolving credentials or signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential material is available from the provider.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// The credential material is present but unusable.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A header required by the signature contains bytes that are not visible ASCII.
    #[error("header {0} is not valid for signing")]
    InvalidHeaderValue(String),

    /// The presigned URL expiry is not in the future of the signing time.
    #[error("invalid expiry timestamp: {0}")]
    InvalidExpiry(i64),
}
