//! Document codec error types.

use std::io;

/// Errors that can occur while encoding or decoding a structured document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// An I/O error during XML writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// A JSON document could not be encoded or parsed.
    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document has no root element.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// The XML stream ended or closed in an unexpected place.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// Text content could not be decoded.
    #[error("failed to parse value: {0}")]
    ParseError(String),

    /// A JSON document's top-level value is not an object.
    #[error("document root is not an object")]
    NotAnObject,
}
