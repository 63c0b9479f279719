//! The service-level client.

use std::fmt;
use std::sync::Arc;

use http::Method;
use qingstor_auth::{CredentialProvider, EnvCredentialProvider};
use qingstor_core::{ClientConfig, CoreResult, Zone};
use qingstor_request::{
    Callback, Dispatcher, OperationContext, RequestError, RequestHandler, Transport, UreqTransport,
};
use tokio::runtime::Handle;
use tracing::debug;

use crate::bucket::Bucket;
use crate::model::{ListBucketsInput, ListBucketsOutput};

/// QingStor service client.
///
/// Owns the configuration, credential source and dispatcher every
/// [`Bucket`] handle derived from it shares.
///
/// # Examples
///
/// ```
/// use qingstor_auth::StaticCredentialProvider;
/// use qingstor_core::{ClientConfig, Zone};
/// use qingstor_sdk::QingStor;
///
/// let service = QingStor::new(
///     ClientConfig::default(),
///     StaticCredentialProvider::new("AK", "SK"),
/// )
/// .unwrap();
/// let bucket = service.get_bucket("photos", Some(Zone::new("pek3a").unwrap()));
/// assert_eq!(bucket.name(), "photos");
/// ```
#[derive(Clone)]
pub struct QingStor {
    config: Arc<ClientConfig>,
    credentials: Arc<dyn CredentialProvider>,
    dispatcher: Dispatcher,
    zone: Option<Zone>,
}

impl fmt::Debug for QingStor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QingStor")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

impl QingStor {
    /// Create a client sending requests over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`qingstor_core::CoreError::Config`] if `config` fails validation.
    pub fn new(
        config: ClientConfig,
        credentials: impl CredentialProvider + 'static,
    ) -> CoreResult<Self> {
        let transport = Arc::new(UreqTransport::new(&config));
        Self::with_transport(config, credentials, transport)
    }

    /// Create a client sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`qingstor_core::CoreError::Config`] if `config` fails validation.
    pub fn with_transport(
        config: ClientConfig,
        credentials: impl CredentialProvider + 'static,
        transport: Arc<dyn Transport>,
    ) -> CoreResult<Self> {
        config.validate()?;
        let dispatcher = Dispatcher::new(transport).with_chunk_size(config.chunk_size);
        debug!(
            host = %config.host,
            zone = config.zone.as_ref().map(Zone::as_str),
            format = %config.document_format,
            "created QingStor client"
        );

        Ok(Self {
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            dispatcher,
            zone: None,
        })
    }

    /// Create a client from `QINGSTOR_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`qingstor_core::CoreError::Config`] if the resulting
    /// configuration fails validation.
    pub fn from_env() -> CoreResult<Self> {
        Self::new(ClientConfig::from_env(), EnvCredentialProvider)
    }

    /// Target `zone` instead of the configured default.
    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Run async calls on `handle`'s blocking pool.
    #[must_use]
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.dispatcher = self.dispatcher.with_runtime(handle);
        self
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A handle for bucket `name` in `zone`, or in this client's zone when `None`.
    #[must_use]
    pub fn get_bucket(&self, name: impl Into<String>, zone: Option<Zone>) -> Bucket {
        Bucket::new(
            name.into(),
            zone.or_else(|| self.zone.clone()),
            Arc::clone(&self.config),
            Arc::clone(&self.credentials),
            self.dispatcher.clone(),
        )
    }

    /// List the buckets visible to the credentials.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn list_buckets(&self, input: ListBucketsInput) -> Result<ListBucketsOutput, RequestError> {
        self.list_buckets_request(input).send()
    }

    /// Prepare a ListBuckets call without sending it.
    #[must_use]
    pub fn list_buckets_request(
        &self,
        input: ListBucketsInput,
    ) -> RequestHandler<ListBucketsInput, ListBucketsOutput> {
        let ctx = OperationContext::builder()
            .service_name("Get Service")
            .operation_name("ListBuckets")
            .method(Method::GET)
            .path_template("/")
            .zone(self.zone.clone())
            .credentials(Arc::clone(&self.credentials))
            .config(Arc::clone(&self.config))
            .build();
        RequestHandler::new(ctx, input, self.dispatcher.clone())
    }

    /// List buckets on a worker, handing the result to `callback`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, or a
    /// construction error. Nothing is scheduled in either case.
    pub fn list_buckets_async(
        &self,
        input: ListBucketsInput,
        callback: Option<Callback<ListBucketsOutput>>,
    ) -> Result<(), RequestError> {
        self.list_buckets_request(input).send_async(callback)
    }
}
