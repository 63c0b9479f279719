//! Response decoding: success to typed output, anything else to [`ServiceError`].

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use qingstor_core::DocumentFormat;
use qingstor_document::decode_document;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{RequestError, ServiceError};
use crate::field::ResponseOutput;
use crate::router::{REQUEST_ID_HEADER, unroute};

/// Decode a complete response.
///
/// 2xx and 304 responses are mapped onto `O`. Every other status becomes a
/// [`RequestError::Service`]. The document format follows `Content-Type`
/// when it names JSON or XML, else `format`.
///
/// # Errors
///
/// Returns [`RequestError::Service`] for non-success statuses, or
/// [`RequestError::Decode`] if a success body cannot be mapped onto `O`.
pub fn decode<O: ResponseOutput>(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
    format: DocumentFormat,
) -> Result<O, RequestError> {
    let format = response_format(headers, format);

    if status.is_success() || status == StatusCode::NOT_MODIFIED {
        debug!(status = status.as_u16(), len = body.len(), "decoding success response");
        return unroute(status, headers, body, format);
    }

    let error = service_error(status, headers, body, format);
    warn!(
        status = error.status_code,
        code = error.code.as_deref().unwrap_or_default(),
        request_id = error.request_id.as_deref().unwrap_or_default(),
        "service returned an error"
    );
    Err(error.into())
}

fn response_format(headers: &HeaderMap, fallback: DocumentFormat) -> DocumentFormat {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(DocumentFormat::from_content_type)
        .unwrap_or(fallback)
}

/// Build a [`ServiceError`], reading the error document when the body parses as one.
fn service_error(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
    format: DocumentFormat,
) -> ServiceError {
    let header_request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut error = ServiceError {
        status_code: status.as_u16(),
        request_id: header_request_id,
        ..ServiceError::default()
    };

    match decode_document(format, &body) {
        Ok(document) => {
            error.code = error_member(&document, "code");
            error.message = error_member(&document, "message");
            error.url = error_member(&document, "url");
            if let Some(request_id) = error_member(&document, "request_id") {
                error.request_id = Some(request_id);
            }
        }
        Err(e) => debug!(error = %e, "error body is not a document"),
    }

    error.raw_body = body;
    error
}

/// Look up an error document member ignoring case and underscores, so
/// `request_id`, `RequestId` and `requestid` all match.
fn error_member(document: &Map<String, Value>, name: &str) -> Option<String> {
    let wanted = normalize_key(name);
    document
        .iter()
        .find(|(key, _)| normalize_key(key) == wanted)
        .and_then(|(_, value)| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
