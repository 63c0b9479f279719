//! The transport seam and the blocking HTTP implementation.
//!
//! A [`Transport`] performs one HTTP exchange. The dispatcher hands it a
//! request body as a [`Read`] it controls, so upload chunking and cancellation
//! checks stay in the dispatcher, and drains the returned body the same way.
//! Status codes are data here: a transport never turns a 4xx or 5xx into an
//! error.

use std::io::{self, Read};
use std::time::Duration;

use http::{HeaderMap, Method, StatusCode};
use qingstor_core::ClientConfig;
use tracing::debug;

/// Errors a transport can report.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established or timed out.
    #[error("connection failed: {0}")]
    Connect(String),

    /// An I/O error while sending or receiving.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// One outgoing HTTP exchange.
pub struct TransportRequest<'a> {
    /// HTTP method.
    pub method: &'a Method,
    /// Absolute request URL.
    pub url: String,
    /// Request headers, including `Authorization` and `Content-Length`.
    pub headers: &'a HeaderMap,
    /// Exact number of bytes `body` yields.
    pub content_length: u64,
    /// The request body.
    pub body: &'a mut dyn Read,
}

impl std::fmt::Debug for TransportRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportRequest")
            .field("method", self.method)
            .field("url", &self.url)
            .field("headers", self.headers)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// The response to a [`TransportRequest`].
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Unread response body.
    pub body: Box<dyn Read>,
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// A blocking HTTP client.
pub trait Transport: Send + Sync {
    /// Perform the exchange and return the response with its body unread.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no response could be obtained.
    fn execute(&self, request: TransportRequest<'_>) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// Create a transport with the timeouts from `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(Duration::from_secs(config.connection_timeout_secs)))
            .timeout_recv_body(Some(Duration::from_secs(config.read_timeout_secs)))
            .timeout_send_body(Some(Duration::from_secs(config.write_timeout_secs)))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending HTTP request");

        let uri: http::Uri = request
            .url
            .parse()
            .map_err(|e| TransportError::Other(format!("invalid URL {}: {e}", request.url)))?;

        let response = if request.content_length == 0 {
            let mut outgoing = http::Request::new(());
            *outgoing.method_mut() = request.method.clone();
            *outgoing.uri_mut() = uri;
            *outgoing.headers_mut() = request.headers.clone();
            self.agent.run(outgoing)
        } else {
            let mut outgoing = http::Request::new(ureq::SendBody::from_reader(request.body));
            *outgoing.method_mut() = request.method.clone();
            *outgoing.uri_mut() = uri;
            *outgoing.headers_mut() = request.headers.clone();
            self.agent.run(outgoing)
        }
        .map_err(map_ureq_error)?;

        let (parts, body) = response.into_parts();
        Ok(TransportResponse {
            status: parts.status,
            headers: parts.headers,
            body: Box::new(body.into_reader()),
        })
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Io(e) => TransportError::Io(e),
        ureq::Error::Timeout(_) | ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            TransportError::Connect(err.to_string())
        }
        other => TransportError::Other(other.to_string()),
    }
}
