//! Query-string signatures for presigned URLs.
//!
//! A presigned URL carries the signature in its query instead of an
//! `Authorization` header. The expiry timestamp replaces the date line of the
//! string to sign, so the URL stops verifying once `expires` has passed.

use tracing::debug;

use crate::canonical::{SigningRequest, build_string_to_sign};
use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::signer::compute_signature;

/// Query parameter carrying the access key ID.
pub const ACCESS_KEY_ID_PARAM: &str = "access_key_id";
/// Query parameter carrying the expiry timestamp (Unix seconds).
pub const EXPIRES_PARAM: &str = "expires";
/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Build the `access_key_id`, `expires` and `signature` query parameters.
///
/// # Errors
///
/// Returns [`AuthError::InvalidExpiry`] if `expires` is not positive, or
/// [`AuthError::InvalidHeaderValue`] if a signed header cannot be read.
pub fn build_presigned_params(
    request: &SigningRequest<'_>,
    credentials: &Credentials,
    expires: i64,
) -> Result<Vec<(String, String)>, AuthError> {
    if expires <= 0 {
        return Err(AuthError::InvalidExpiry(expires));
    }

    let expires = expires.to_string();
    let string_to_sign = build_string_to_sign(request, &expires)?;
    debug!(string_to_sign, "built presigned string to sign");
    let signature = compute_signature(&credentials.secret_access_key, &string_to_sign);

    Ok(vec![
        (
            ACCESS_KEY_ID_PARAM.to_owned(),
            credentials.access_key_id.clone(),
        ),
        (EXPIRES_PARAM.to_owned(), expires),
        (SIGNATURE_PARAM.to_owned(), signature),
    ])
}
