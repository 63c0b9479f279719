//! Object-level operations.

use bytes::Bytes;
use qingstor_request::{
    FieldSpec, FieldValue, FromFieldValue, RequestInput, ResponseMeta, ResponseOutput, Validation,
};

use super::assign;

/// Storage classes an object may be written with.
pub const STORAGE_CLASSES: &[&str] = &["STANDARD", "STANDARD_IA"];

/// HeadObject input.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectInput {
    /// Path: `bucket-name`. Filled in by [`crate::Bucket`].
    pub bucket_name: Option<String>,
    /// Path: `object-key`. Filled in by [`crate::Bucket`].
    pub object_key: Option<String>,
    /// Header: `If-None-Match`.
    pub if_none_match: Option<String>,
}

impl RequestInput for HeadObjectInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::path("bucket_name", "bucket-name").required(),
        FieldSpec::path("object_key", "object-key").required(),
        FieldSpec::header("if_none_match", "If-None-Match"),
    ];

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "bucket_name" => self.bucket_name.clone().map(FieldValue::from),
            "object_key" => self.object_key.clone().map(FieldValue::from),
            "if_none_match" => self.if_none_match.clone().map(FieldValue::from),
            _ => None,
        }
    }
}

/// HeadObject output.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectOutput {
    /// Status and request ID.
    pub meta: ResponseMeta,
    /// Header: `Content-Length`.
    pub content_length: Option<u64>,
    /// Header: `Content-Type`.
    pub content_type: Option<String>,
    /// Header: `ETag`.
    pub etag: Option<String>,
    /// Header: `Last-Modified`.
    pub last_modified: Option<String>,
    /// Header: `x-qs-storage-class`.
    pub storage_class: Option<String>,
}

impl ResponseOutput for HeadObjectOutput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::header("content_length", "Content-Length"),
        FieldSpec::header("content_type", "Content-Type"),
        FieldSpec::header("etag", "ETag"),
        FieldSpec::header("last_modified", "Last-Modified"),
        FieldSpec::header("storage_class", "x-qs-storage-class"),
    ];

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String> {
        match name {
            "content_length" => assign(&mut self.content_length, value),
            "content_type" => assign(&mut self.content_type, value),
            "etag" => assign(&mut self.etag, value),
            "last_modified" => assign(&mut self.last_modified, value),
            "storage_class" => assign(&mut self.storage_class, value),
            _ => Ok(()),
        }
    }

    fn meta_mut(&mut self) -> &mut ResponseMeta {
        &mut self.meta
    }
}

/// GetObject input.
#[derive(Debug, Clone, Default)]
pub struct GetObjectInput {
    /// Path: `bucket-name`. Filled in by [`crate::Bucket`].
    pub bucket_name: Option<String>,
    /// Path: `object-key`. Filled in by [`crate::Bucket`].
    pub object_key: Option<String>,
    /// Header: `Range`, e.g. `bytes=0-1023`.
    pub range: Option<String>,
    /// Header: `If-None-Match`. A matching entity tag yields `304` and no body.
    pub if_none_match: Option<String>,
}

impl RequestInput for GetObjectInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::path("bucket_name", "bucket-name").required(),
        FieldSpec::path("object_key", "object-key").required(),
        FieldSpec::header("range", "Range"),
        FieldSpec::header("if_none_match", "If-None-Match"),
    ];

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "bucket_name" => self.bucket_name.clone().map(FieldValue::from),
            "object_key" => self.object_key.clone().map(FieldValue::from),
            "range" => self.range.clone().map(FieldValue::from),
            "if_none_match" => self.if_none_match.clone().map(FieldValue::from),
            _ => None,
        }
    }
}

/// GetObject output.
#[derive(Debug, Clone, Default)]
pub struct GetObjectOutput {
    /// Status and request ID.
    pub meta: ResponseMeta,
    /// The object content.
    pub body: Bytes,
    /// Header: `Content-Length`.
    pub content_length: Option<u64>,
    /// Header: `Content-Type`.
    pub content_type: Option<String>,
    /// Header: `Content-Range`, set for ranged reads.
    pub content_range: Option<String>,
    /// Header: `ETag`.
    pub etag: Option<String>,
}

impl ResponseOutput for GetObjectOutput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::body("body"),
        FieldSpec::header("content_length", "Content-Length"),
        FieldSpec::header("content_type", "Content-Type"),
        FieldSpec::header("content_range", "Content-Range"),
        FieldSpec::header("etag", "ETag"),
    ];

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String> {
        match name {
            "body" => {
                self.body = Bytes::from_field_value(value)?;
                Ok(())
            }
            "content_length" => assign(&mut self.content_length, value),
            "content_type" => assign(&mut self.content_type, value),
            "content_range" => assign(&mut self.content_range, value),
            "etag" => assign(&mut self.etag, value),
            _ => Ok(()),
        }
    }

    fn meta_mut(&mut self) -> &mut ResponseMeta {
        &mut self.meta
    }
}

/// PutObject input.
#[derive(Debug, Clone, Default)]
pub struct PutObjectInput {
    /// Path: `bucket-name`. Filled in by [`crate::Bucket`].
    pub bucket_name: Option<String>,
    /// Path: `object-key`. Filled in by [`crate::Bucket`].
    pub object_key: Option<String>,
    /// Header: `Content-Type`.
    pub content_type: Option<String>,
    /// Header: `Content-MD5`, base64 of the body digest.
    pub content_md5: Option<String>,
    /// Header: `x-qs-storage-class`, one of [`STORAGE_CLASSES`].
    pub storage_class: Option<String>,
    /// The object content. Sent empty when unset.
    pub body: Option<Bytes>,
}

impl RequestInput for PutObjectInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::path("bucket_name", "bucket-name").required(),
        FieldSpec::path("object_key", "object-key").required(),
        FieldSpec::header("content_type", "Content-Type"),
        FieldSpec::header("content_md5", "Content-MD5"),
        FieldSpec::header("storage_class", "x-qs-storage-class")
            .validate(Validation::OneOf(STORAGE_CLASSES)),
        FieldSpec::body("body"),
    ];

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "bucket_name" => self.bucket_name.clone().map(FieldValue::from),
            "object_key" => self.object_key.clone().map(FieldValue::from),
            "content_type" => self.content_type.clone().map(FieldValue::from),
            "content_md5" => self.content_md5.clone().map(FieldValue::from),
            "storage_class" => self.storage_class.clone().map(FieldValue::from),
            "body" => self.body.clone().map(FieldValue::from),
            _ => None,
        }
    }
}

/// PutObject output.
#[derive(Debug, Clone, Default)]
pub struct PutObjectOutput {
    /// Status and request ID.
    pub meta: ResponseMeta,
    /// Header: `ETag`.
    pub etag: Option<String>,
}

impl ResponseOutput for PutObjectOutput {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::header("etag", "ETag")];

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String> {
        match name {
            "etag" => assign(&mut self.etag, value),
            _ => Ok(()),
        }
    }

    fn meta_mut(&mut self) -> &mut ResponseMeta {
        &mut self.meta
    }
}
