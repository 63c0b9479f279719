//! Service-level operations.

use qingstor_request::{FieldSpec, FieldValue, RequestInput, ResponseMeta, ResponseOutput};

use super::assign;
use super::types::BucketModel;

/// ListBuckets input.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsInput {
    /// Query: `limit`. Maximum number of buckets to return.
    pub limit: Option<i64>,
    /// Query: `offset`. Number of buckets to skip.
    pub offset: Option<i64>,
    /// Header: `Location`. Only list buckets in this zone.
    pub location: Option<String>,
}

impl RequestInput for ListBucketsInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::query("limit", "limit"),
        FieldSpec::query("offset", "offset"),
        FieldSpec::header("location", "Location"),
    ];

    fn field_value(&self, name: &str) -> Option<FieldValue> {
        match name {
            "limit" => self.limit.map(FieldValue::from),
            "offset" => self.offset.map(FieldValue::from),
            "location" => self.location.clone().map(FieldValue::from),
            _ => None,
        }
    }
}

/// ListBuckets output.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsOutput {
    /// Status and request ID.
    pub meta: ResponseMeta,
    /// Element: `buckets`.
    pub buckets: Option<Vec<BucketModel>>,
    /// Element: `count`. Total number of buckets.
    pub count: Option<i64>,
}

impl ResponseOutput for ListBucketsOutput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::element("buckets", "buckets"),
        FieldSpec::element("count", "count"),
    ];

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String> {
        match name {
            "buckets" => assign(&mut self.buckets, value),
            "count" => assign(&mut self.count, value),
            _ => Ok(()),
        }
    }

    fn meta_mut(&mut self) -> &mut ResponseMeta {
        &mut self.meta
    }
}
