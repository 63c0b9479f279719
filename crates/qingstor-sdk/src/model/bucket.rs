//! Bucket-level operations.

use qingstor_request::{FieldSpec, FieldValue, RequestInput, ResponseMeta, ResponseOutput, Validation};

use super::types::{AclModel, KeyModel, OwnerModel};
use super::{assign, assign_document, document};

/// Largest page a bucket listing may request.
pub const MAX_LIST_LIMIT: i64 = 1000;

/// ListObjects input.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsInput {
    /// Path: `bucket-name`. Filled in by [`crate::Bucket`].
    pub bucket_name: Option<String>,
    /// Query: `prefix`.
    pub prefix: Option<String>,
    /// Query: `delimiter`. Groups keys sharing a prefix up to this character.
    pub delimiter: Option<String>,
    /// Query: `marker`. Listing starts after this key.
    pub marker: Option<String>,
    /// Query: `limit`, between 0 and [`MAX_LIST_LIMIT`].
    pub limit: Option<i64>,
}

impl RequestInput for ListObjectsInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::path("bucket_name", "bucket-name").required(),
        FieldSpec::query("prefix", "prefix"),
        FieldSpec::query("delimiter", "delimiter"),
        FieldSpec::query("marker", "marker"),
        FieldSpec::query("limit", "limit").validate(Validation::Range {
            min: 0,
            max: MAX_LIST_LIMIT,
        }),
    ];

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "bucket_name" => self.bucket_name.clone().map(FieldValue::from),
            "prefix" => self.prefix.clone().map(FieldValue::from),
            "delimiter" => self.delimiter.clone().map(FieldValue::from),
            "marker" => self.marker.clone().map(FieldValue::from),
            "limit" => self.limit.map(FieldValue::from),
            _ => None,
        }
    }
}

/// ListObjects output.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsOutput {
    /// Status and request ID.
    pub meta: ResponseMeta,
    /// Element: `name`. The bucket name.
    pub name: Option<String>,
    /// Element: `keys`.
    pub keys: Option<Vec<KeyModel>>,
    /// Element: `common_prefixes`.
    pub common_prefixes: Option<Vec<String>>,
    /// Element: `prefix`.
    pub prefix: Option<String>,
    /// Element: `delimiter`.
    pub delimiter: Option<String>,
    /// Element: `marker`.
    pub marker: Option<String>,
    /// Element: `next_marker`. Pass as `marker` to fetch the next page.
    pub next_marker: Option<String>,
    /// Element: `limit`.
    pub limit: Option<i64>,
    /// Element: `has_more`.
    pub has_more: Option<bool>,
}

impl ResponseOutput for ListObjectsOutput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::element("name", "name"),
        FieldSpec::element("keys", "keys"),
        FieldSpec::element("common_prefixes", "common_prefixes"),
        FieldSpec::element("prefix", "prefix"),
        FieldSpec::element("delimiter", "delimiter"),
        FieldSpec::element("marker", "marker"),
        FieldSpec::element("next_marker", "next_marker"),
        FieldSpec::element("limit", "limit"),
        FieldSpec::element("has_more", "has_more"),
    ];

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String> {
        match name {
            "name" => assign(&mut self.name, value),
            "keys" => assign(&mut self.keys, value),
            "common_prefixes" => assign(&mut self.common_prefixes, value),
            "prefix" => assign(&mut self.prefix, value),
            "delimiter" => assign(&mut self.delimiter, value),
            "marker" => assign(&mut self.marker, value),
            "next_marker" => assign(&mut self.next_marker, value),
            "limit" => assign(&mut self.limit, value),
            "has_more" => assign(&mut self.has_more, value),
            _ => Ok(()),
        }
    }

    fn meta_mut(&mut self) -> &mut ResponseMeta {
        &mut self.meta
    }
}

/// GetBucketACL input.
#[derive(Debug, Clone, Default)]
pub struct GetBucketAclInput {
    /// Path: `bucket-name`. Filled in by [`crate::Bucket`].
    pub bucket_name: Option<String>,
}

impl RequestInput for GetBucketAclInput {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::path("bucket_name", "bucket-name").required()];

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "bucket_name" => self.bucket_name.clone().map(FieldValue::from),
            _ => None,
        }
    }
}

/// GetBucketACL output.
#[derive(Debug, Clone, Default)]
pub struct GetBucketAclOutput {
    /// Status and request ID.
    pub meta: ResponseMeta,
    /// Element: `owner`.
    pub owner: Option<OwnerModel>,
    /// Element: `acl`.
    pub acl: Option<Vec<AclModel>>,
}

impl ResponseOutput for GetBucketAclOutput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::element("owner", "owner"),
        FieldSpec::element("acl", "acl"),
    ];

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String> {
        match name {
            "owner" => assign_document(&mut self.owner, value),
            "acl" => assign(&mut self.acl, value),
            _ => Ok(()),
        }
    }

    fn meta_mut(&mut self) -> &mut ResponseMeta {
        &mut self.meta
    }
}

/// PutBucketACL input.
#[derive(Debug, Clone, Default)]
pub struct PutBucketAclInput {
    /// Path: `bucket-name`. Filled in by [`crate::Bucket`].
    pub bucket_name: Option<String>,
    /// Element: `acl`. Replaces the whole bucket ACL.
    pub acl: Option<Vec<AclModel>>,
}

impl RequestInput for PutBucketAclInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::path("bucket_name", "bucket-name").required(),
        FieldSpec::element("acl", "acl").required(),
    ];

    const DOCUMENT_ROOT: &'static str = "AccessControlPolicy";

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "bucket_name" => self.bucket_name.clone().map(FieldValue::from),
            "acl" => self.acl.as_ref().and_then(document),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), String> {
        let missing = self
            .acl
            .iter()
            .flatten()
            .any(|entry| entry.permission.is_none() || entry.grantee.grantee_type.is_none());
        if missing {
            return Err("every acl entry needs a grantee type and a permission".to_owned());
        }
        Ok(())
    }
}

/// PutBucketACL output.
#[derive(Debug, Clone, Default)]
pub struct PutBucketAclOutput {
    /// Status and request ID.
    pub meta: ResponseMeta,
}

impl ResponseOutput for PutBucketAclOutput {
    const FIELDS: &'static [FieldSpec] = &[];

    fn set_field(&mut self, _name: &str, _value: FieldValue) -> Result<(), String> {
        Ok(())
    }

    fn meta_mut(&mut self) -> &mut ResponseMeta {
        &mut self.meta
    }
}
