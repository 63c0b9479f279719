//! Credential material and providers.
//!
//! This module defines [`Credentials`], the [`CredentialProvider`] trait the
//! request pipeline pulls current credential material from, and two providers:
//! [`StaticCredentialProvider`] for fixed keys and [`EnvCredentialProvider`]
//! which reads the process environment on every call.

use crate::error::AuthError;

/// Environment variable holding the access key ID.
pub const ACCESS_KEY_ID_ENV: &str = "QINGSTOR_ACCESS_KEY_ID";

/// Environment variable holding the secret access key.
pub const SECRET_ACCESS_KEY_ENV: &str = "QINGSTOR_SECRET_ACCESS_KEY";

/// An access key pair used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The access key ID, sent in clear inside the `Authorization` header.
    pub access_key_id: String,
    /// The secret access key, only ever used as the HMAC key.
    pub secret_access_key: String,
}

impl Credentials {
    /// Create a new key pair.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Reject empty keys.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if either key is empty.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_key_id.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "access key ID is empty".to_owned(),
            ));
        }
        if self.secret_access_key.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "secret access key is empty".to_owned(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .finish()
    }
}

/// Source of the current credential material.
///
/// Implementations may cache, rotate or fetch credentials; the pipeline asks
/// once per signed request and never inspects the result beyond signing.
pub trait CredentialProvider: Send + Sync {
    /// Return the credentials to sign the next request with.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if no usable credentials are available.
    fn credentials(&self) -> Result<Credentials, AuthError>;
}

/// A provider that always returns the same key pair.
///
/// # Examples
///
/// ```
/// use qingstor_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new("ACCESS", "SECRET");
/// let creds = provider.credentials().unwrap();
/// assert_eq!(creds.access_key_id, "ACCESS");
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Create a provider from an access key ID and secret access key.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        self.credentials.validate()?;
        Ok(self.credentials.clone())
    }
}

/// A provider reading [`ACCESS_KEY_ID_ENV`] and [`SECRET_ACCESS_KEY_ENV`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialProvider;

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        let access_key_id = std::env::var(ACCESS_KEY_ID_ENV)
            .map_err(|_| AuthError::MissingCredentials(ACCESS_KEY_ID_ENV.to_owned()))?;
        let secret_access_key = std::env::var(SECRET_ACCESS_KEY_ENV)
            .map_err(|_| AuthError::MissingCredentials(SECRET_ACCESS_KEY_ENV.to_owned()))?;
        let credentials = Credentials::new(access_key_id, secret_access_key);
        credentials.validate()?;
        Ok(credentials)
    }
}
