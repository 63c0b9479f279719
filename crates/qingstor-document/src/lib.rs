//! JSON and XML document codec for QingStor request and response bodies.
//!
//! Structured bodies are built from `element` fields and read back into them.
//! Both formats share one in-memory shape, a `serde_json` object keyed by wire
//! name, so the field router never needs to know which format is on the wire.
//!
//! - [`encode_document`] serializes a field map as JSON or XML
//! - [`decode_document`] parses JSON or XML into a field map

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{decode_document, from_json, from_xml};
pub use error::DocumentError;
pub use serialize::{encode_document, to_json, to_xml};
