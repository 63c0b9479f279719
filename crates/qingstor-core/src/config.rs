//! Client configuration.
//!
//! Provides [`ClientConfig`], the client-wide settings every operation context
//! refers to. Values come from defaults, the typed builder, environment
//! variables ([`ClientConfig::from_env`]) or a JSON document
//! ([`ClientConfig::from_json`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::error::{CoreError, CoreResult};
use crate::types::{DocumentFormat, Zone};

/// SDK version reported in the `User-Agent` header.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chunk size for body transfers (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Client-wide configuration shared by every request.
///
/// # Examples
///
/// ```
/// use qingstor_core::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.host, "qingstor.com");
/// assert_eq!(config.port, 443);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "snake_case", default)]
pub struct ClientConfig {
    /// URL scheme, `https` or `http`.
    #[builder(default = String::from("https"), setter(into))]
    pub protocol: String,

    /// Service host without the zone prefix.
    #[builder(default = String::from("qingstor.com"), setter(into))]
    pub host: String,

    /// Service port.
    #[builder(default = 443)]
    pub port: u16,

    /// Default zone used when an operation does not name one.
    #[builder(default, setter(strip_option))]
    pub zone: Option<Zone>,

    /// Whether the bucket name is addressed through the host instead of the path.
    #[builder(default = false)]
    pub enable_virtual_host_style: bool,

    /// Extra text appended to the `User-Agent` header.
    #[builder(default, setter(into))]
    pub additional_user_agent: String,

    /// Wire format for structured request and response documents.
    #[builder(default)]
    pub document_format: DocumentFormat,

    /// Upper bound, in bytes, of one transferred body chunk.
    #[builder(default = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Connection timeout in seconds.
    #[builder(default = 60)]
    pub connection_timeout_secs: u64,

    /// Response read timeout in seconds.
    #[builder(default = 60)]
    pub read_timeout_secs: u64,

    /// Request body write timeout in seconds.
    #[builder(default = 60)]
    pub write_timeout_secs: u64,

    /// Headers added to every request unless a call sets the same header.
    #[builder(default)]
    pub default_headers: BTreeMap<String, String>,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"), setter(into))]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            protocol: String::from("https"),
            host: String::from("qingstor.com"),
            port: 443,
            zone: None,
            enable_virtual_host_style: false,
            additional_user_agent: String::new(),
            document_format: DocumentFormat::Json,
            chunk_size: DEFAULT_CHUNK_SIZE,
            connection_timeout_secs: 60,
            read_timeout_secs: 60,
            write_timeout_secs: 60,
            default_headers: BTreeMap::new(),
            log_level: String::from("info"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `QINGSTOR_PROTOCOL` | `https` |
    /// | `QINGSTOR_HOST` | `qingstor.com` |
    /// | `QINGSTOR_PORT` | `443` |
    /// | `QINGSTOR_ZONE` | *(unset)* |
    /// | `QINGSTOR_ENABLE_VIRTUAL_HOST_STYLE` | `false` |
    /// | `QINGSTOR_ADDITIONAL_USER_AGENT` | *(empty)* |
    /// | `QINGSTOR_DOCUMENT_FORMAT` | `json` |
    /// | `QINGSTOR_CHUNK_SIZE` | `65536` |
    /// | `QINGSTOR_CONNECTION_TIMEOUT` | `60` |
    /// | `QINGSTOR_READ_TIMEOUT` | `60` |
    /// | `QINGSTOR_WRITE_TIMEOUT` | `60` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// Values that fail to parse are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("QINGSTOR_PROTOCOL") {
            config.protocol = v;
        }
        if let Ok(v) = std::env::var("QINGSTOR_HOST") {
            config.host = v;
        }
        if let Some(port) = env_parse("QINGSTOR_PORT") {
            config.port = port;
        }
        if let Ok(v) = std::env::var("QINGSTOR_ZONE") {
            match Zone::new(v) {
                Ok(zone) => config.zone = Some(zone),
                Err(e) => warn!(error = %e, "ignoring QINGSTOR_ZONE"),
            }
        }
        if let Ok(v) = std::env::var("QINGSTOR_ENABLE_VIRTUAL_HOST_STYLE") {
            config.enable_virtual_host_style = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("QINGSTOR_ADDITIONAL_USER_AGENT") {
            config.additional_user_agent = v;
        }
        if let Some(format) = env_parse("QINGSTOR_DOCUMENT_FORMAT") {
            config.document_format = format;
        }
        if let Some(n) = env_parse("QINGSTOR_CHUNK_SIZE") {
            config.chunk_size = n;
        }
        if let Some(n) = env_parse("QINGSTOR_CONNECTION_TIMEOUT") {
            config.connection_timeout_secs = n;
        }
        if let Some(n) = env_parse("QINGSTOR_READ_TIMEOUT") {
            config.read_timeout_secs = n;
        }
        if let Some(n) = env_parse("QINGSTOR_WRITE_TIMEOUT") {
            config.write_timeout_secs = n;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Parse configuration from a JSON document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Parse`] if the document is not valid JSON for this
    /// shape, or [`CoreError::Config`] if the result fails [`Self::validate`].
    pub fn from_json(document: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce valid requests.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] describing the first unusable value.
    pub fn validate(&self) -> CoreResult<()> {
        if self.protocol != "https" && self.protocol != "http" {
            return Err(CoreError::Config(format!(
                "protocol must be http or https, got {:?}",
                self.protocol
            )));
        }
        if self.host.is_empty() {
            return Err(CoreError::Config("host must not be empty".to_owned()));
        }
        if self.port == 0 {
            return Err(CoreError::Config("port must not be zero".to_owned()));
        }
        if self.chunk_size == 0 {
            return Err(CoreError::Config("chunk_size must be positive".to_owned()));
        }
        if let Some(zone) = &self.zone {
            Zone::new(zone.as_str())?;
        }
        if self
            .additional_user_agent
            .chars()
            .any(|c| !(' '..='~').contains(&c) || c == '"' || c == '(' || c == ')')
        {
            return Err(CoreError::Config(
                "additional_user_agent contains forbidden characters".to_owned(),
            ));
        }
        Ok(())
    }

    /// The `User-Agent` header value for requests made with this configuration.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let base = format!(
            "qingstor-sdk-rust/{VERSION} (Rust; {}/{})",
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        if self.additional_user_agent.is_empty() {
            base
        } else {
            format!("{base} {}", self.additional_user_agent)
        }
    }

    /// Whether `port` is the default for `protocol` and can be left out of URLs.
    #[must_use]
    pub fn is_default_port(&self) -> bool {
        matches!(
            (self.protocol.as_str(), self.port),
            ("https", 443) | ("http", 80)
        )
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Read and parse an environment variable, logging values that do not parse.
fn env_parse<T>(name: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(variable = name, value = %raw, error = %e, "ignoring unparsable environment value");
            None
        }
    }
}
