//! Request pipeline error types.

use std::fmt;

use bytes::Bytes;
use qingstor_auth::AuthError;

use crate::transport::TransportError;

/// Errors a call can fail with.
///
/// `MissingRequiredField` and `InvalidArgument` are raised while the request
/// is assembled, before anything is signed or transmitted.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// A required input field is absent, or a path placeholder is unresolved.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// An input value, field table or call argument is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Credential resolution or signing failed.
    #[error("signing failed: {0}")]
    Signing(#[from] AuthError),

    /// The transport could not complete the exchange.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a non-success status.
    #[error(transparent)]
    Service(Box<ServiceError>),

    /// A success response could not be mapped onto the output description.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The caller's cancellation handler asked to stop the transfer.
    #[error("Request has been cancelled.")]
    Cancelled,
}

impl From<ServiceError> for RequestError {
    fn from(err: ServiceError) -> Self {
        Self::Service(Box::new(err))
    }
}

impl RequestError {
    /// The service failure, if this error is one.
    #[must_use]
    pub fn as_service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

/// A non-success response from the service.
///
/// `code`, `message`, `request_id` and `url` are filled when the body parses
/// as an error document; `raw_body` always holds the payload as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceError {
    /// HTTP status code.
    pub status_code: u16,
    /// Service error code (e.g. `object_not_exists`).
    pub code: Option<String>,
    /// Human-readable error message.
    pub message: Option<String>,
    /// Request ID, from the error document or the `x-qs-request-id` header.
    pub request_id: Option<String>,
    /// Documentation URL for the error code.
    pub url: Option<String>,
    /// The undecoded response body.
    pub raw_body: Bytes,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service error {}", self.status_code)?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " [request id {request_id}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}
