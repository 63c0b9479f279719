//! Typed inputs and outputs of the supported operations.
//!
//! Each model carries a static field table naming where every field lives on
//! the wire; the request engine routes values through those tables.

pub mod bucket;
pub mod object;
pub mod service;
pub mod types;

use qingstor_request::{FieldValue, FromFieldValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use bucket::{
    GetBucketAclInput, GetBucketAclOutput, ListObjectsInput, ListObjectsOutput, PutBucketAclInput,
    PutBucketAclOutput,
};
pub use object::{
    GetObjectInput, GetObjectOutput, HeadObjectInput, HeadObjectOutput, PutObjectInput,
    PutObjectOutput,
};
pub use service::{ListBucketsInput, ListBucketsOutput};
pub use types::{AclModel, BucketModel, GranteeModel, KeyModel, OwnerModel};

/// Store a decoded value into an optional output slot.
fn assign<T: FromFieldValue>(slot: &mut Option<T>, value: FieldValue) -> Result<(), String> {
    *slot = Some(T::from_field_value(value)?);
    Ok(())
}

/// Decode a single nested model.
fn assign_document<T: DeserializeOwned>(
    slot: &mut Option<T>,
    value: FieldValue,
) -> Result<(), String> {
    let document = value
        .to_document()
        .ok_or("expected a document, got raw bytes")?;
    *slot = Some(serde_json::from_value(document).map_err(|e| e.to_string())?);
    Ok(())
}

/// Encode a nested model as a document value.
fn document<T: Serialize>(value: &T) -> Option<FieldValue> {
    serde_json::to_value(value).ok().map(FieldValue::Document)
}
