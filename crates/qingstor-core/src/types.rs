//! Common type definitions shared across the SDK crates.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// QingStor zone identifier (e.g. `pek3b`, `sh1a`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Zone(String);

impl Zone {
    /// Create a new zone after checking it can be used as a host label.
    ///
    /// # Errors
    /// Returns an error if the zone is empty or contains characters that are
    /// not valid in a DNS label.
    pub fn new(zone: impl Into<String>) -> Result<Self, CoreError> {
        let zone = zone.into();
        let valid = !zone.is_empty()
            && zone
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !zone.starts_with('-')
            && !zone.ends_with('-');
        if !valid {
            return Err(CoreError::InvalidZone(zone));
        }
        Ok(Self(zone))
    }

    /// Get the zone as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Zone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Wire format used for structured request and response documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// `application/json` documents (the service default).
    #[default]
    Json,
    /// `application/xml` documents.
    Xml,
}

impl DocumentFormat {
    /// The `Content-Type` value for bodies in this format.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Infer the format from a `Content-Type` header value.
    ///
    /// Returns `None` when the media type is neither JSON nor XML.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let media_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if media_type.ends_with("/json") || media_type.ends_with("+json") {
            Some(Self::Json)
        } else if media_type.ends_with("/xml") || media_type.ends_with("+xml") {
            Some(Self::Xml)
        } else {
            None
        }
    }

    /// Returns the format as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(CoreError::Config(format!(
                "unknown document format: {other}"
            ))),
        }
    }
}
