//! Request construction, signing, dispatch and response decoding for the
//! QingStor SDK.
//!
//! This crate is the engine under the typed service façade. It handles:
//!
//! - **Field routing** ([`router`]): places each field of a typed input in
//!   exactly one wire location, and maps responses back onto typed outputs,
//!   driven by static field tables ([`field`]).
//!
//! - **Building** ([`builder`]): resolves the endpoint path template, host and
//!   layered headers into a [`BuiltRequest`], then signs it into a
//!   [`SignedRequest`].
//!
//! - **Dispatch** ([`dispatch`]): sends a request synchronously, on a worker
//!   with a callback, or as a future, moving bodies in chunks and polling the
//!   caller's [`CancellationHandler`] before each one.
//!
//! - **Decoding** ([`decode`]): success responses become typed outputs, all
//!   others become a [`ServiceError`].
//!
//! - **Transport** ([`transport`]): the blocking HTTP seam and its `ureq`
//!   implementation.
//!
//! # Architecture
//!
//! ```text
//! typed input
//!   -> route (field tables)
//!   -> build (OperationContext)          BuiltRequest
//!   -> sign (Signer, CredentialProvider) SignedRequest
//!   -> transmit (Transport, chunked, cancellation polled)
//!   -> decode
//! typed output | RequestError
//! ```

pub mod body;
pub mod builder;
pub mod cancel;
pub mod context;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod field;
pub mod handler;
pub mod progress;
pub mod router;
pub mod transport;

pub use body::RequestBody;
pub use builder::{BuiltRequest, SignedRequest};
pub use cancel::{CancellationFlag, CancellationHandler};
pub use context::OperationContext;
pub use dispatch::{CallOptions, CallState, Callback, Dispatcher};
pub use error::{RequestError, ServiceError};
pub use field::{
    FieldSpec, FieldValue, FromFieldValue, Location, RequestInput, ResponseMeta, ResponseOutput,
    Validation,
};
pub use handler::RequestHandler;
pub use progress::ProgressListener;
pub use router::{RoutedFields, route, unroute};
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse, UreqTransport};
