//! Document deserialization: JSON or XML bytes to a field map.
//!
//! XML documents are folded into the same `serde_json` shape the serializer
//! consumes: leaf elements become strings, elements with children become
//! objects, and repeated sibling elements become arrays. The root element
//! itself is dropped; its children are the fields.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use serde_json::{Map, Value};

use qingstor_core::DocumentFormat;

use crate::error::DocumentError;

/// Decode a response or request body in `format` into a field map.
///
/// An empty (or whitespace-only) body decodes to an empty map.
///
/// # Errors
///
/// Returns [`DocumentError`] if the document is malformed, or
/// [`DocumentError::NotAnObject`] if a JSON document is not an object.
pub fn decode_document(
    format: DocumentFormat,
    body: &[u8],
) -> Result<Map<String, Value>, DocumentError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match format {
        DocumentFormat::Json => from_json(body),
        DocumentFormat::Xml => from_xml(body),
    }
}

/// Parse a JSON object.
///
/// # Errors
///
/// Returns [`DocumentError`] if the bytes are not a JSON object.
pub fn from_json(body: &[u8]) -> Result<Map<String, Value>, DocumentError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentError::NotAnObject),
    }
}

/// Parse an XML document into the field map of its root element.
///
/// # Errors
///
/// Returns [`DocumentError`] if the XML is malformed or has no root element.
pub fn from_xml(xml: &[u8]) -> Result<Map<String, Value>, DocumentError> {
    let mut reader = Reader::from_reader(xml);

    // Skip the XML declaration and find the root element.
    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                return match read_element(&mut reader)? {
                    Value::Object(map) => Ok(map),
                    _ => Ok(Map::new()),
                };
            }
            Event::Empty(_) => return Ok(Map::new()),
            Event::Eof => {
                return Err(DocumentError::MissingElement("root element".to_owned()));
            }
            _ => {}
        }
    }
}

/// Read the content of the current element through its end tag.
///
/// Expects the reader to be positioned right after a `Start` event.
fn read_element(reader: &mut Reader<&[u8]>) -> Result<Value, DocumentError> {
    let mut children = Map::new();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = element_name(e.name().as_ref())?;
                let value = read_element(reader)?;
                insert_child(&mut children, name, value);
            }
            Event::Empty(e) => {
                let name = element_name(e.name().as_ref())?;
                insert_child(&mut children, name, Value::String(String::new()));
            }
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| DocumentError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| DocumentError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|err| DocumentError::ParseError(err.to_string()))?
                {
                    text.push(ch);
                } else {
                    let entity = e
                        .decode()
                        .map_err(|err| DocumentError::ParseError(err.to_string()))?;
                    let resolved = resolve_predefined_entity(&entity).ok_or_else(|| {
                        DocumentError::ParseError(format!("unknown entity &{entity};"))
                    })?;
                    text.push_str(resolved);
                }
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(DocumentError::UnexpectedElement(
                    "unexpected EOF while reading element".to_owned(),
                ));
            }
            _ => {}
        }
    }

    // Whitespace between child elements is formatting, not content.
    if children.is_empty() {
        Ok(Value::String(text))
    } else {
        Ok(Value::Object(children))
    }
}

fn element_name(raw: &[u8]) -> Result<String, DocumentError> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|e| DocumentError::ParseError(e.to_string()))
}

/// Insert a child, turning repeated siblings into an array.
fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}
