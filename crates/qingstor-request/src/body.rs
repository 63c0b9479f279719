//! Request body payloads.
//!
//! A [`RequestBody`] is one of three modes:
//!
//! - **Empty**: no payload (`GET`, `HEAD`, most `DELETE`s).
//! - **Bytes**: the raw body field, sent as given.
//! - **Document**: element fields serialized as JSON or XML.

use bytes::Bytes;
use qingstor_core::DocumentFormat;

/// The payload of a built request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// A raw body.
    Bytes(Bytes),
    /// A serialized document and the format it was written in.
    Document {
        /// Encoded document bytes.
        bytes: Bytes,
        /// Format of `bytes`.
        format: DocumentFormat,
    },
}

impl RequestBody {
    /// Body length in bytes, the value of `Content-Length`.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    /// Whether the body carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// The `Content-Type` implied by the body. Raw bodies imply none.
    #[must_use]
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Document { format, .. } => Some(format.content_type()),
            Self::Empty | Self::Bytes(_) => None,
        }
    }

    /// Borrow the payload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Bytes(bytes) | Self::Document { bytes, .. } => bytes.as_ref(),
        }
    }

    /// Take the payload. Cloning `Bytes` is a reference-count bump.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Empty => Bytes::new(),
            Self::Bytes(bytes) | Self::Document { bytes, .. } => bytes.clone(),
        }
    }
}
