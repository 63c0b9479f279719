//! Shared model types nested inside operation documents.

use serde::{Deserialize, Deserializer, Serialize};

/// A bucket entry of a service listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketModel {
    /// Bucket name.
    pub name: Option<String>,
    /// Zone the bucket lives in.
    pub location: Option<String>,
    /// Bucket endpoint URL.
    pub url: Option<String>,
    /// Creation time, RFC 3339.
    pub created: Option<String>,
}

/// An object entry of a bucket listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyModel {
    /// Object key.
    pub key: Option<String>,
    /// Object size in bytes.
    #[serde(deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
    /// Entity tag.
    pub etag: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Storage class, `STANDARD` or `STANDARD_IA`.
    pub storage_class: Option<String>,
    /// Creation time, RFC 3339.
    pub created: Option<String>,
    /// Last modification, Unix seconds.
    #[serde(deserialize_with = "lenient_u64")]
    pub modified: Option<u64>,
}

/// The owner of a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerModel {
    /// User ID.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

/// Who an ACL entry applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GranteeModel {
    /// `user` or `group`.
    #[serde(rename = "type")]
    pub grantee_type: Option<String>,
    /// User ID, for `user` grantees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group or user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One bucket ACL entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclModel {
    /// The grantee.
    pub grantee: GranteeModel,
    /// `READ`, `WRITE` or `FULL_CONTROL`.
    pub permission: Option<String>,
}

/// Numbers arrive as JSON numbers or, from XML, as text.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
