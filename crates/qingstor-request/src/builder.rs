//! Request assembly and the build → sign typestate.
//!
//! [`build`] turns an [`OperationContext`] and [`RoutedFields`] into a
//! [`BuiltRequest`]: the path template is resolved and percent-encoded, the
//! endpoint is derived from the zone and addressing style, and headers are
//! layered in a fixed precedence (lowest first):
//!
//! 1. `User-Agent`
//! 2. `Date`
//! 3. client-wide default headers from configuration
//! 4. the body's `Content-Type`
//! 5. per-call routed headers
//!
//! `Content-Length` is always set from the body.
//!
//! A `BuiltRequest` is cloneable so a caller can re-sign from scratch. Signing
//! consumes it and yields a [`SignedRequest`], the only thing the dispatcher
//! transmits.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use http::header::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HeaderMap, HeaderName, HeaderValue,
    USER_AGENT,
};
use http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use qingstor_auth::{AuthError, Credentials, Signer, SigningRequest};
use tracing::debug;

use crate::body::RequestBody;
use crate::context::OperationContext;
use crate::error::RequestError;
use crate::router::RoutedFields;

/// Characters left unescaped in paths: RFC 3986 unreserved plus `/`.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Characters left unescaped in query keys and values: RFC 3986 unreserved.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Placeholder that moves into the host under virtual-host addressing.
const BUCKET_PLACEHOLDER: &str = "bucket-name";

/// A fully assembled, unsigned request.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    method: Method,
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: BTreeMap<String, String>,
    headers: HeaderMap,
    body: RequestBody,
    operation: String,
}

/// Assemble a request from its operation context and routed fields.
///
/// # Errors
///
/// - [`RequestError::MissingRequiredField`] if a path placeholder has no value.
/// - [`RequestError::InvalidArgument`] if a configured default header or the
///   user agent is not a legal HTTP header.
pub fn build(ctx: &OperationContext, routed: RoutedFields) -> Result<BuiltRequest, RequestError> {
    let config = ctx.config();
    let (path_template, sub_resources) = split_template(ctx.path_template());

    let mut bucket = None;
    let mut path = String::with_capacity(path_template.len());
    let mut rest = path_template;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        let name = &rest[start + 1..start + len];
        let value = routed
            .path
            .get(name)
            .ok_or_else(|| RequestError::MissingRequiredField(name.to_owned()))?;
        path.push_str(&rest[..start]);
        let encoded = utf8_percent_encode(value, PATH_ENCODE_SET).to_string();
        if name == BUCKET_PLACEHOLDER && path == "/" {
            bucket = Some(encoded.clone());
        }
        path.push_str(&encoded);
        rest = &rest[start + len + 1..];
    }
    path.push_str(rest);

    let mut host = match ctx.zone() {
        Some(zone) => format!("{zone}.{}", config.host),
        None => config.host.clone(),
    };
    if config.enable_virtual_host_style {
        if let Some(bucket) = bucket {
            host = format!("{bucket}.{host}");
            path = path[1 + bucket.len()..].to_owned();
            if !path.starts_with('/') {
                path.insert(0, '/');
            }
        }
    }

    let mut query = routed.query;
    for (key, value) in sub_resources {
        query.insert(key, value);
    }

    let headers = layer_headers(ctx, &routed.headers, &routed.body)?;
    let port = (!config.is_default_port()).then_some(config.port);

    debug!(
        operation = ctx.operation_name(),
        method = %ctx.method(),
        host = %host,
        path = %path,
        "built request"
    );

    Ok(BuiltRequest {
        method: ctx.method().clone(),
        scheme: config.protocol.clone(),
        host,
        port,
        path,
        query,
        headers,
        body: routed.body,
        operation: ctx.operation_name().to_owned(),
    })
}

/// Split `/<bucket-name>?acl` into the path and its sub-resource parameters.
fn split_template(template: &str) -> (&str, Vec<(String, String)>) {
    let Some((path, query)) = template.split_once('?') else {
        return (template, Vec::new());
    };
    let params = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_owned(), v.to_owned()),
            None => (pair.to_owned(), String::new()),
        })
        .collect();
    (path, params)
}

fn layer_headers(
    ctx: &OperationContext,
    routed: &HeaderMap,
    body: &RequestBody,
) -> Result<HeaderMap, RequestError> {
    let config = ctx.config();
    let mut headers = HeaderMap::new();

    let user_agent = HeaderValue::from_str(&config.user_agent())
        .map_err(|_| RequestError::InvalidArgument("user agent is not a valid header".to_owned()))?;
    headers.insert(USER_AGENT, user_agent);

    let date = chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string();
    if let Ok(date) = HeaderValue::from_str(&date) {
        headers.insert(DATE, date);
    }

    for (name, value) in &config.default_headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            RequestError::InvalidArgument(format!("default header name {name:?} is not valid"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            RequestError::InvalidArgument(format!("default header {name:?} has an invalid value"))
        })?;
        headers.insert(header_name, header_value);
    }

    if let Some(content_type) = body.content_type() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    for name in routed.keys() {
        headers.remove(name);
    }
    for (name, value) in routed {
        headers.append(name.clone(), value.clone());
    }

    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    Ok(headers)
}

fn encode_query(query: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in query {
        out.push(if out.is_empty() { '?' } else { '&' });
        out.extend(utf8_percent_encode(key, QUERY_ENCODE_SET));
        if !value.is_empty() {
            out.push('=');
            out.extend(utf8_percent_encode(value, QUERY_ENCODE_SET));
        }
    }
    out
}

impl BuiltRequest {
    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Host, including zone and virtual-host bucket prefixes.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Percent-encoded path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Sorted query parameters, not yet encoded.
    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body.
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Operation name, for logs.
    #[must_use]
    pub fn operation_name(&self) -> &str {
        &self.operation
    }

    /// Absolute URL with the encoded query string.
    #[must_use]
    pub fn url(&self) -> String {
        self.url_with_query(&self.query)
    }

    fn url_with_query(&self, query: &BTreeMap<String, String>) -> String {
        let mut url = format!("{}://{}", self.scheme, self.host);
        if let Some(port) = self.port {
            let _ = write!(url, ":{port}");
        }
        url.push_str(&self.path);
        url.push_str(&encode_query(query));
        url
    }

    fn signing_request(&self) -> SigningRequest<'_> {
        SigningRequest {
            method: self.method.as_str(),
            path: &self.path,
            query: &self.query,
            headers: &self.headers,
        }
    }

    /// Sign the request, consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Signing`] if the signer fails or produces a value
    /// that is not a legal header.
    pub fn sign(
        mut self,
        signer: &dyn Signer,
        credentials: &Credentials,
    ) -> Result<SignedRequest, RequestError> {
        let authorization = signer.authorization(&self.signing_request(), credentials)?;
        let value = HeaderValue::from_str(&authorization)
            .map_err(|_| AuthError::InvalidHeaderValue(AUTHORIZATION.to_string()))?;
        self.headers.insert(AUTHORIZATION, value);
        debug!(operation = %self.operation, "signed request");
        Ok(SignedRequest { inner: self })
    }

    /// A URL that performs this request without an `Authorization` header
    /// until `expires` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Signing`] if the signer rejects the request or expiry.
    pub fn presigned_url(
        &self,
        signer: &dyn Signer,
        credentials: &Credentials,
        expires: i64,
    ) -> Result<String, RequestError> {
        let params = signer.presign(&self.signing_request(), credentials, expires)?;
        let mut query = self.query.clone();
        query.extend(params);
        Ok(self.url_with_query(&query))
    }
}

/// A signed request, consumed by exactly one transmission.
#[derive(Debug)]
pub struct SignedRequest {
    inner: BuiltRequest,
}

impl SignedRequest {
    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Request headers, including `Authorization`.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Request body.
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.inner.body
    }

    /// Absolute URL.
    #[must_use]
    pub fn url(&self) -> String {
        self.inner.url()
    }

    /// Operation name, for logs.
    #[must_use]
    pub fn operation_name(&self) -> &str {
        &self.inner.operation
    }
}
