//! Typed QingStor clients.
//!
//! [`QingStor`] is the service-level entry point; [`Bucket`] handles carry
//! the bucket and object operations. Each operation is available as a
//! blocking call, as a prepared [`RequestHandler`] and as a callback-driven
//! async call.
//!
//! ```no_run
//! use qingstor_sdk::QingStor;
//! use qingstor_sdk::model::ListBucketsInput;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = QingStor::from_env()?;
//! let listing = service.list_buckets(ListBucketsInput {
//!     limit: Some(10),
//!     ..ListBucketsInput::default()
//! })?;
//! for bucket in listing.buckets.unwrap_or_default() {
//!     println!("{:?}", bucket.name);
//! }
//! # Ok(())
//! # }
//! ```

mod bucket;
pub mod model;
mod service;

pub use bucket::Bucket;
pub use qingstor_auth::{
    CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
};
pub use qingstor_core::{ClientConfig, DocumentFormat, Zone};
pub use qingstor_request::{
    CallState, CancellationFlag, CancellationHandler, ProgressListener, RequestError,
    RequestHandler, ServiceError,
};
pub use service::QingStor;
