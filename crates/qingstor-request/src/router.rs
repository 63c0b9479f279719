//! Field routing: typed values to wire locations, and back.
//!
//! [`route`] walks an input's field table and places every present value in
//! exactly one location: a path placeholder, the query map, the header map or
//! the body. [`unroute`] does the reverse for a response: header fields are
//! read case-insensitively, element fields from the decoded document and the
//! raw body field receives the whole payload.

use std::collections::BTreeMap;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use qingstor_core::DocumentFormat;
use qingstor_document::{decode_document, encode_document};
use serde_json::{Map, Value};
use tracing::debug;

use crate::body::RequestBody;
use crate::error::RequestError;
use crate::field::{FieldSpec, FieldValue, Location, RequestInput, ResponseOutput};

/// Response header carrying the service request ID.
pub const REQUEST_ID_HEADER: &str = "x-qs-request-id";

/// Input values sorted into their wire locations.
#[derive(Debug, Clone, Default)]
pub struct RoutedFields {
    /// Path placeholder values keyed by wire name, not yet percent-encoded.
    pub path: BTreeMap<String, String>,
    /// Query parameters keyed by wire name.
    pub query: BTreeMap<String, String>,
    /// Per-call headers.
    pub headers: HeaderMap,
    /// The body payload.
    pub body: RequestBody,
}

/// Reject tables that declare conflicting body strategies.
///
/// # Errors
///
/// Returns [`RequestError::InvalidArgument`] if the table declares more than
/// one raw body field, or mixes a raw body field with element fields.
pub fn check_table(fields: &[FieldSpec]) -> Result<(), RequestError> {
    let bodies = fields
        .iter()
        .filter(|f| f.location == Location::Body)
        .count();
    let elements = fields
        .iter()
        .filter(|f| f.location == Location::Element)
        .count();

    if bodies > 1 {
        return Err(RequestError::InvalidArgument(
            "field table declares more than one body field".to_owned(),
        ));
    }
    if bodies == 1 && elements > 0 {
        return Err(RequestError::InvalidArgument(
            "field table mixes a body field with element fields".to_owned(),
        ));
    }
    Ok(())
}

/// Route the present fields of `input` to their wire locations.
///
/// Element fields are serialized together in `format`.
///
/// # Errors
///
/// - [`RequestError::MissingRequiredField`] if a required field is absent, or a
///   required path field is empty.
/// - [`RequestError::InvalidArgument`] if a value fails its validation rule, is
///   not a legal header, cannot be written to its location, or the table itself
///   is inconsistent.
pub fn route<I: RequestInput>(
    input: &I,
    format: DocumentFormat,
) -> Result<RoutedFields, RequestError> {
    check_table(I::FIELDS)?;
    input.validate().map_err(RequestError::InvalidArgument)?;

    let mut routed = RoutedFields::default();
    let mut elements = Map::new();

    for spec in I::FIELDS {
        let Some(value) = input.field_value(spec.name) else {
            if spec.required {
                return Err(RequestError::MissingRequiredField(spec.name.to_owned()));
            }
            continue;
        };

        if let Some(rule) = spec.validation {
            rule.check(spec.name, &value)?;
        }

        match spec.location {
            Location::Path => {
                let text = wire_text(spec, &value)?;
                if text.is_empty() {
                    if spec.required {
                        return Err(RequestError::MissingRequiredField(spec.name.to_owned()));
                    }
                    continue;
                }
                routed.path.insert(spec.wire_name.to_owned(), text);
            }
            Location::Query => {
                let text = wire_text(spec, &value)?;
                routed.query.insert(spec.wire_name.to_owned(), text);
            }
            Location::Header => {
                let name = HeaderName::from_bytes(spec.wire_name.as_bytes()).map_err(|_| {
                    RequestError::InvalidArgument(format!(
                        "{}: {:?} is not a valid header name",
                        spec.name, spec.wire_name
                    ))
                })?;
                let text = wire_text(spec, &value)?;
                let value = HeaderValue::from_str(&text).map_err(|_| {
                    RequestError::InvalidArgument(format!(
                        "{}: value is not a valid header value",
                        spec.name
                    ))
                })?;
                routed.headers.insert(name, value);
            }
            Location::Element => {
                let member = value.to_document().ok_or_else(|| {
                    RequestError::InvalidArgument(format!(
                        "{}: binary values cannot be body elements",
                        spec.name
                    ))
                })?;
                elements.insert(spec.wire_name.to_owned(), member);
            }
            Location::Body => {
                routed.body = raw_body(spec, value, format, I::DOCUMENT_ROOT)?;
            }
        }
    }

    if !elements.is_empty() {
        let bytes = encode_document(format, I::DOCUMENT_ROOT, &elements)
            .map_err(|e| RequestError::InvalidArgument(format!("body document: {e}")))?;
        routed.body = RequestBody::Document { bytes, format };
    }

    debug!(
        path = routed.path.len(),
        query = routed.query.len(),
        headers = routed.headers.len(),
        body_len = routed.body.len(),
        "routed input fields"
    );
    Ok(routed)
}

/// Decode a success response into an output description.
///
/// The document is only parsed when the table has element fields.
///
/// # Errors
///
/// Returns [`RequestError::Decode`] if the body document is malformed or a
/// value does not fit its output field, or [`RequestError::InvalidArgument`]
/// if the output table is inconsistent.
pub fn unroute<O: ResponseOutput>(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
    format: DocumentFormat,
) -> Result<O, RequestError> {
    check_table(O::FIELDS)?;

    let mut output = O::default();
    {
        let meta = output.meta_mut();
        meta.status_code = status.as_u16();
        meta.request_id = header_text(headers, REQUEST_ID_HEADER);
    }

    let document = if O::FIELDS.iter().any(|f| f.location == Location::Element) {
        decode_document(format, &body).map_err(|e| RequestError::Decode(e.to_string()))?
    } else {
        Map::new()
    };

    for spec in O::FIELDS {
        let value = match spec.location {
            Location::Header => {
                header_text(headers, &spec.wire_name.to_ascii_lowercase()).map(FieldValue::Text)
            }
            Location::Element => document
                .get(spec.wire_name)
                .filter(|v| !v.is_null())
                .cloned()
                .map(FieldValue::from_document),
            Location::Body => Some(FieldValue::Blob(body.clone())),
            Location::Path | Location::Query => {
                return Err(RequestError::InvalidArgument(format!(
                    "{}: output fields cannot use the {} location",
                    spec.name, spec.location
                )));
            }
        };

        if let Some(value) = value {
            output
                .set_field(spec.name, value)
                .map_err(|e| RequestError::Decode(format!("{}: {e}", spec.name)))?;
        }
    }

    Ok(output)
}

fn wire_text(spec: &FieldSpec, value: &FieldValue) -> Result<String, RequestError> {
    value.to_wire_string().ok_or_else(|| {
        RequestError::InvalidArgument(format!(
            "{}: value cannot be written to the {} location",
            spec.name, spec.location
        ))
    })
}

fn raw_body(
    spec: &FieldSpec,
    value: FieldValue,
    format: DocumentFormat,
    root: &str,
) -> Result<RequestBody, RequestError> {
    match value {
        FieldValue::Blob(bytes) => Ok(RequestBody::Bytes(bytes)),
        FieldValue::Text(text) => Ok(RequestBody::Bytes(Bytes::from(text))),
        FieldValue::Document(Value::Object(map)) => {
            let bytes = encode_document(format, root, &map)
                .map_err(|e| RequestError::InvalidArgument(format!("{}: {e}", spec.name)))?;
            Ok(RequestBody::Document { bytes, format })
        }
        other => Err(RequestError::InvalidArgument(format!(
            "{}: {other:?} cannot be sent as a body",
            spec.name
        ))),
    }
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}
