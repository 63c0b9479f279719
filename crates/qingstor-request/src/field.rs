//! Field tables: how typed inputs and outputs map onto the wire.
//!
//! Every input and output type declares a static table of [`FieldSpec`]s.
//! Each entry names one logical field, the single place it travels on the
//! wire ([`Location`]), the wire name used there, whether it is required and
//! an optional [`Validation`] rule. The router walks these tables; no
//! runtime introspection is involved.

use std::fmt;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RequestError;

/// Where a field travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Substituted into a `<placeholder>` of the path template.
    Path,
    /// A query string parameter.
    Query,
    /// An HTTP header.
    Header,
    /// A member of the structured JSON or XML body document.
    Element,
    /// The whole raw body.
    Body,
}

impl Location {
    /// Returns the location as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Element => "element",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value constraint checked before the request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Text, blob or list values must not be empty.
    NonEmpty,
    /// The wire string must be one of the listed values.
    OneOf(&'static [&'static str]),
    /// Integer values must lie in `min..=max`.
    Range {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
}

impl Validation {
    /// Check `value` against this rule.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] naming `field` if the value
    /// violates the rule.
    pub fn check(self, field: &str, value: &FieldValue) -> Result<(), RequestError> {
        match self {
            Self::NonEmpty => {
                let empty = match value {
                    FieldValue::Text(s) => s.is_empty(),
                    FieldValue::Blob(b) => b.is_empty(),
                    FieldValue::Document(Value::Array(items)) => items.is_empty(),
                    FieldValue::Document(Value::String(s)) => s.is_empty(),
                    FieldValue::Document(Value::Null) => true,
                    _ => false,
                };
                if empty {
                    return Err(RequestError::InvalidArgument(format!(
                        "{field} must not be empty"
                    )));
                }
            }
            Self::OneOf(allowed) => {
                let wire = value.to_wire_string().unwrap_or_default();
                if !allowed.contains(&wire.as_str()) {
                    return Err(RequestError::InvalidArgument(format!(
                        "{field} must be one of {allowed:?}, got {wire:?}"
                    )));
                }
            }
            Self::Range { min, max } => {
                let number = i64::from_field_value(value.clone())
                    .map_err(|e| RequestError::InvalidArgument(format!("{field}: {e}")))?;
                if !(min..=max).contains(&number) {
                    return Err(RequestError::InvalidArgument(format!(
                        "{field} must be between {min} and {max}, got {number}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One entry of a field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Logical field name, as passed to `field_value` / `set_field`.
    pub name: &'static str,
    /// Wire location.
    pub location: Location,
    /// Name on the wire: placeholder, query key, header name or element name.
    pub wire_name: &'static str,
    /// Whether the field must be present.
    pub required: bool,
    /// Optional value constraint.
    pub validation: Option<Validation>,
}

impl FieldSpec {
    const fn new(name: &'static str, location: Location, wire_name: &'static str) -> Self {
        Self {
            name,
            location,
            wire_name,
            required: false,
            validation: None,
        }
    }

    /// A path placeholder field.
    #[must_use]
    pub const fn path(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, Location::Path, wire_name)
    }

    /// A query parameter field.
    #[must_use]
    pub const fn query(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, Location::Query, wire_name)
    }

    /// A header field.
    #[must_use]
    pub const fn header(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, Location::Header, wire_name)
    }

    /// A body document element field.
    #[must_use]
    pub const fn element(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, Location::Element, wire_name)
    }

    /// The raw body field.
    #[must_use]
    pub const fn body(name: &'static str) -> Self {
        Self::new(name, Location::Body, "Body")
    }

    /// Mark the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a validation rule.
    #[must_use]
    pub const fn validate(mut self, validation: Validation) -> Self {
        self.validation = Some(validation);
        self
    }
}

/// A field value in transit between a typed struct and the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A string.
    Text(String),
    /// An integer.
    Integer(i64),
    /// A boolean.
    Boolean(bool),
    /// A structured value, only meaningful as a body element.
    Document(Value),
    /// Raw bytes, only meaningful as the raw body.
    Blob(Bytes),
}

impl FieldValue {
    /// The value as a path, query or header string.
    ///
    /// Returns `None` for blobs and for documents that are not scalars.
    #[must_use]
    pub fn to_wire_string(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::Document(Value::String(s)) => Some(s.clone()),
            Self::Document(Value::Number(n)) => Some(n.to_string()),
            Self::Document(Value::Bool(b)) => Some(b.to_string()),
            Self::Document(_) | Self::Blob(_) => None,
        }
    }

    /// The value as a document member. Returns `None` for blobs.
    #[must_use]
    pub fn to_document(&self) -> Option<Value> {
        match self {
            Self::Text(s) => Some(Value::String(s.clone())),
            Self::Integer(n) => Some(Value::from(*n)),
            Self::Boolean(b) => Some(Value::Bool(*b)),
            Self::Document(v) => Some(v.clone()),
            Self::Blob(_) => None,
        }
    }

    /// Wrap a decoded document member, keeping scalars as scalars.
    #[must_use]
    pub fn from_document(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Document(Value::Number(n)),
            },
            other => Self::Document(other),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Bytes> for FieldValue {
    fn from(value: Bytes) -> Self {
        Self::Blob(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Document(value)
    }
}

/// Conversion from a decoded [`FieldValue`] into an output field type.
///
/// Header values and XML elements always arrive as text, so numeric and
/// boolean conversions accept their string forms too.
pub trait FromFieldValue: Sized {
    /// Convert `value`, describing the mismatch on failure.
    ///
    /// # Errors
    ///
    /// Returns a description of why the value does not fit this type.
    fn from_field_value(value: FieldValue) -> Result<Self, String>;
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Text(s) | FieldValue::Document(Value::String(s)) => Ok(s),
            FieldValue::Integer(n) => Ok(n.to_string()),
            FieldValue::Boolean(b) => Ok(b.to_string()),
            FieldValue::Document(other) => Ok(other.to_string()),
            FieldValue::Blob(b) => String::from_utf8(b.to_vec()).map_err(|e| e.to_string()),
        }
    }
}

impl FromFieldValue for i64 {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Integer(n) => Ok(n),
            FieldValue::Text(s) | FieldValue::Document(Value::String(s)) => s
                .trim()
                .parse()
                .map_err(|e| format!("invalid integer {s:?}: {e}")),
            FieldValue::Document(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| format!("{n} is not a 64-bit integer")),
            other => Err(format!("expected an integer, got {other:?}")),
        }
    }
}

impl FromFieldValue for i32 {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        let wide = i64::from_field_value(value)?;
        i32::try_from(wide).map_err(|_| format!("{wide} does not fit in 32 bits"))
    }
}

impl FromFieldValue for u64 {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        let wide = i64::from_field_value(value)?;
        u64::try_from(wide).map_err(|_| format!("{wide} is negative"))
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Boolean(b) | FieldValue::Document(Value::Bool(b)) => Ok(b),
            FieldValue::Text(s) | FieldValue::Document(Value::String(s)) => {
                match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    _ => Err(format!("invalid boolean {s:?}")),
                }
            }
            other => Err(format!("expected a boolean, got {other:?}")),
        }
    }
}

impl FromFieldValue for Bytes {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Blob(b) => Ok(b),
            FieldValue::Text(s) => Ok(Bytes::from(s)),
            other => Err(format!("expected a body, got {other:?}")),
        }
    }
}

impl FromFieldValue for Value {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        value
            .to_document()
            .ok_or_else(|| "expected a document, got raw bytes".to_owned())
    }
}

/// Lists: a JSON array, or one or more repeated XML elements.
impl<T: DeserializeOwned> FromFieldValue for Vec<T> {
    fn from_field_value(value: FieldValue) -> Result<Self, String> {
        let document = value
            .to_document()
            .ok_or_else(|| "expected a list, got raw bytes".to_owned())?;
        let items = match document {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            // An empty list travels as an empty XML element.
            Value::String(s) if s.is_empty() => Vec::new(),
            // A single repeated XML element decodes as the bare item.
            single => vec![single],
        };
        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|e| e.to_string()))
            .collect()
    }
}

/// A typed input: a field table plus accessors the router reads values through.
pub trait RequestInput {
    /// The static field table.
    const FIELDS: &'static [FieldSpec];

    /// Root element name of the XML body document.
    const DOCUMENT_ROOT: &'static str = "Request";

    /// The current value of the field with logical name `name`, or `None` when unset.
    fn field_value(&self, name: &str) -> Option<FieldValue>;

    /// Cross-field checks beyond the per-field rules.
    ///
    /// # Errors
    ///
    /// Returns a description of the violated constraint.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A typed output: a field table plus a setter the router writes values through.
pub trait ResponseOutput: Default + Send + 'static {
    /// The static field table. Only header, element and body locations apply.
    const FIELDS: &'static [FieldSpec];

    /// Store the decoded value of the field with logical name `name`.
    ///
    /// # Errors
    ///
    /// Returns a description of why the value does not fit the field.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String>;

    /// Mutable access to the response metadata.
    fn meta_mut(&mut self) -> &mut ResponseMeta;
}

/// Metadata every decoded response carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// HTTP status code.
    pub status_code: u16,
    /// Value of the `x-qs-request-id` response header.
    pub request_id: Option<String>,
}
