//! The signing capability and the QingStor header signature.
//!
//! ```text
//! Signature     = Base64(HMAC-SHA256(SecretAccessKey, StringToSign))
//! Authorization = "QS " + AccessKeyId + ":" + Signature
//! ```
//!
//! The string to sign is described in [`crate::canonical`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::canonical::{SigningRequest, build_string_to_sign};
use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::presigned::build_presigned_params;

type HmacSha256 = Hmac<Sha256>;

/// Authorization scheme prefix of the `Authorization` header.
pub const AUTHORIZATION_SCHEME: &str = "QS";

/// A request-signing capability.
///
/// The request pipeline calls [`Signer::authorization`] exactly once per
/// transmission, after the request is fully built.
pub trait Signer: Send + Sync {
    /// Compute the `Authorization` header value for `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the credentials or the request cannot be signed.
    fn authorization(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
    ) -> Result<String, AuthError>;

    /// Compute the query parameters of a presigned URL valid until `expires`
    /// (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the credentials or the request cannot be signed.
    fn presign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        expires: i64,
    ) -> Result<Vec<(String, String)>, AuthError>;
}

/// The QingStor HMAC-SHA256 signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct QingStorSigner;

impl Signer for QingStorSigner {
    fn authorization(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
    ) -> Result<String, AuthError> {
        credentials.validate()?;

        let date = match request.headers.get(http::header::DATE) {
            Some(value) => value
                .to_str()
                .map_err(|_| AuthError::InvalidHeaderValue("date".to_owned()))?,
            None => "",
        };
        let string_to_sign = build_string_to_sign(request, date)?;
        debug!(string_to_sign, "built string to sign");

        let signature = compute_signature(&credentials.secret_access_key, &string_to_sign);
        Ok(format!(
            "{AUTHORIZATION_SCHEME} {}:{signature}",
            credentials.access_key_id
        ))
    }

    fn presign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        expires: i64,
    ) -> Result<Vec<(String, String)>, AuthError> {
        credentials.validate()?;
        build_presigned_params(request, credentials, expires)
    }
}

/// Compute `Base64(HMAC-SHA256(secret_key, string_to_sign))`.
#[must_use]
pub fn compute_signature(secret_key: &str, string_to_sign: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .expect("HMAC can accept keys of any length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}
