//! Credentials and request signing for the QingStor SDK.
//!
//! Requests are signed with the QingStor `QS` scheme: an HMAC-SHA256 over a
//! canonical string built from the method, a few standard headers, the
//! `x-qs-*` headers and the resource path. The same string, with the expiry
//! timestamp in place of the date, signs presigned URLs.
//!
//! The request pipeline depends only on the [`CredentialProvider`] and
//! [`Signer`] traits; [`QingStorSigner`] is the implementation shipped here.

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod presigned;
pub mod signer;

pub use canonical::SigningRequest;
pub use credentials::{
    CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
};
pub use error::AuthError;
pub use signer::{QingStorSigner, Signer};
