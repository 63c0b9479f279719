//! Canonical string-to-sign construction for QingStor signatures.
//!
//! ```text
//! StringToSign = HTTP-Verb + "\n" +
//!                Content-MD5 + "\n" +
//!                Content-Type + "\n" +
//!                Date + "\n" +
//!                CanonicalizedHeaders +
//!                CanonicalizedResource
//! ```
//!
//! `CanonicalizedHeaders` are the `x-qs-*` headers, lowercased, sorted and
//! written as `name:value\n`. `CanonicalizedResource` is the request path
//! followed by the sorted sub-resource query parameters.

use std::collections::BTreeMap;

use http::HeaderMap;

use crate::error::AuthError;

/// Prefix of service-specific headers covered by the signature.
pub const SIGNED_HEADER_PREFIX: &str = "x-qs-";

/// Query parameters that name a sub-resource and therefore take part in the signature.
pub const SUB_RESOURCES: &[&str] = &[
    "acl",
    "append",
    "cname",
    "cors",
    "delete",
    "image",
    "lifecycle",
    "logging",
    "mirror",
    "notification",
    "part_number",
    "policy",
    "position",
    "replication",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
    "stats",
    "upload_id",
    "uploads",
];

/// A read-only view of the request parts a signature covers.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// HTTP method, uppercase.
    pub method: &'a str,
    /// Percent-encoded request path, exactly as transmitted.
    pub path: &'a str,
    /// Decoded query parameters.
    pub query: &'a BTreeMap<String, String>,
    /// Request headers.
    pub headers: &'a HeaderMap,
}

/// Build the string to sign, using `date` for the date line.
///
/// Header-signed requests pass their `Date` header; presigned URLs pass the
/// expiry timestamp instead.
///
/// # Errors
///
/// Returns [`AuthError::InvalidHeaderValue`] if a signed header is not visible ASCII.
pub fn build_string_to_sign(request: &SigningRequest<'_>, date: &str) -> Result<String, AuthError> {
    let content_md5 = header_value(request.headers, "content-md5")?;
    let content_type = header_value(request.headers, "content-type")?;
    let headers = build_canonicalized_headers(request.headers)?;
    let resource = build_canonicalized_resource(request.path, request.query);

    Ok(format!(
        "{}\n{content_md5}\n{content_type}\n{date}\n{headers}{resource}",
        request.method
    ))
}

/// Build the canonicalized `x-qs-*` header block.
///
/// Repeated headers are joined with commas. Each entry ends with a newline.
///
/// # Errors
///
/// Returns [`AuthError::InvalidHeaderValue`] if a signed header is not visible ASCII.
///
/// # Examples
///
/// ```
/// use http::HeaderMap;
/// use qingstor_auth::canonical::build_canonicalized_headers;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-qs-date", "Mon, 01 Jan 2024 00:00:00 GMT".parse().unwrap());
/// headers.insert("content-type", "text/plain".parse().unwrap());
/// let block = build_canonicalized_headers(&headers).unwrap();
/// assert_eq!(block, "x-qs-date:Mon, 01 Jan 2024 00:00:00 GMT\n");
/// ```
pub fn build_canonicalized_headers(headers: &HeaderMap) -> Result<String, AuthError> {
    let mut signed: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (name, value) in headers {
        let name = name.as_str();
        if name.starts_with(SIGNED_HEADER_PREFIX) {
            let value = value
                .to_str()
                .map_err(|_| AuthError::InvalidHeaderValue(name.to_owned()))?;
            signed.entry(name).or_default().push(value.trim());
        }
    }

    let mut block = String::new();
    for (name, values) in &signed {
        block.push_str(name);
        block.push(':');
        block.push_str(&values.join(","));
        block.push('\n');
    }
    Ok(block)
}

/// Build the canonicalized resource: path plus sorted sub-resource parameters.
///
/// Parameters without a value are written as a bare key.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use qingstor_auth::canonical::build_canonicalized_resource;
///
/// let mut query = BTreeMap::new();
/// query.insert("acl".to_owned(), String::new());
/// query.insert("limit".to_owned(), "10".to_owned());
/// assert_eq!(build_canonicalized_resource("/bucket", &query), "/bucket?acl");
/// ```
#[must_use]
pub fn build_canonicalized_resource(path: &str, query: &BTreeMap<String, String>) -> String {
    let path = if path.is_empty() { "/" } else { path };

    // BTreeMap iteration is already sorted by key.
    let params: Vec<String> = query
        .iter()
        .filter(|(key, _)| SUB_RESOURCES.contains(&key.as_str()))
        .map(|(key, value)| {
            if value.is_empty() {
                key.clone()
            } else {
                format!("{key}={value}")
            }
        })
        .collect();

    if params.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{}", params.join("&"))
    }
}

/// Fetch a header as a string, or the empty string when absent.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AuthError> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(str::trim)
            .map_err(|_| AuthError::InvalidHeaderValue(name.to_owned())),
        None => Ok(""),
    }
}
