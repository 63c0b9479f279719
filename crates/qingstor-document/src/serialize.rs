//! Document serialization: field maps to JSON or XML bytes.
//!
//! Element fields are collected into a `serde_json` map keyed by wire name.
//! JSON bodies are that map verbatim. XML bodies wrap it in a root element
//! with these conventions:
//!
//! - Strings, numbers and booleans become `<name>text</name>`
//! - Objects become nested elements
//! - Arrays repeat the element once per item
//! - `null` values are omitted

use std::io::{self, Write};

use bytes::Bytes;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};
use serde_json::{Map, Value};

use qingstor_core::DocumentFormat;

use crate::error::DocumentError;

/// Encode `fields` in `format`. `root` names the XML root element and is
/// ignored for JSON.
///
/// # Errors
///
/// Returns [`DocumentError`] if serialization fails.
pub fn encode_document(
    format: DocumentFormat,
    root: &str,
    fields: &Map<String, Value>,
) -> Result<Bytes, DocumentError> {
    let encoded = match format {
        DocumentFormat::Json => to_json(fields)?,
        DocumentFormat::Xml => to_xml(root, fields)?,
    };
    tracing::trace!(%format, len = encoded.len(), "encoded document");
    Ok(Bytes::from(encoded))
}

/// Serialize a field map as a JSON object.
///
/// # Errors
///
/// Returns [`DocumentError::Json`] if a value cannot be serialized.
pub fn to_json(fields: &Map<String, Value>) -> Result<Vec<u8>, DocumentError> {
    Ok(serde_json::to_vec(fields)?)
}

/// Serialize a field map as an XML document with declaration and root element.
///
/// # Errors
///
/// Returns [`DocumentError`] if writing fails.
pub fn to_xml(root: &str, fields: &Map<String, Value>) -> Result<Vec<u8>, DocumentError> {
    let mut buf = Vec::with_capacity(256);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element(root)
        .write_inner_content(|w| write_fields(w, fields))?;

    Ok(buf)
}

fn write_fields<W: Write>(writer: &mut Writer<W>, fields: &Map<String, Value>) -> io::Result<()> {
    for (name, value) in fields {
        write_value(writer, name, value)?;
    }
    Ok(())
}

fn write_value<W: Write>(writer: &mut Writer<W>, name: &str, value: &Value) -> io::Result<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => write_text_element(writer, name, if *b { "true" } else { "false" })?,
        Value::Number(n) => write_text_element(writer, name, &n.to_string())?,
        Value::String(s) => write_text_element(writer, name, s)?,
        // Keeps an empty list present on the wire.
        Value::Array(items) if items.is_empty() => {
            writer.create_element(name).write_empty()?;
        }
        Value::Array(items) => {
            for item in items {
                write_value(writer, name, item)?;
            }
        }
        Value::Object(children) => {
            writer
                .create_element(name)
                .write_inner_content(|w| write_fields(w, children))?;
        }
    }
    Ok(())
}

/// Write a simple `<tag>text</tag>` element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}
