//! Per-operation call context.

use std::fmt;
use std::sync::Arc;

use http::Method;
use qingstor_auth::{CredentialProvider, QingStorSigner, Signer};
use qingstor_core::{ClientConfig, Zone};
use typed_builder::TypedBuilder;

/// Everything the pipeline needs to know about one operation, besides its input.
///
/// Built once per call by the service façade and never mutated. All shared
/// collaborators sit behind `Arc`, so cloning is cheap.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use http::Method;
/// use qingstor_auth::StaticCredentialProvider;
/// use qingstor_core::ClientConfig;
/// use qingstor_request::OperationContext;
///
/// let ctx = OperationContext::builder()
///     .service_name("QingStor")
///     .operation_name("List Buckets")
///     .method(Method::GET)
///     .path_template("/")
///     .credentials(Arc::new(StaticCredentialProvider::new("AK", "SK")))
///     .config(Arc::new(ClientConfig::default()))
///     .build();
/// assert_eq!(ctx.operation_name(), "List Buckets");
/// ```
#[derive(Clone, TypedBuilder)]
pub struct OperationContext {
    #[builder(setter(into))]
    service_name: String,
    #[builder(setter(into))]
    operation_name: String,
    method: Method,
    /// Path with `<placeholder>` segments and an optional `?sub-resource` suffix.
    #[builder(setter(into))]
    path_template: String,
    /// Overrides the configured zone when set.
    #[builder(default)]
    zone: Option<Zone>,
    credentials: Arc<dyn CredentialProvider>,
    config: Arc<ClientConfig>,
    #[builder(default = default_signer())]
    signer: Arc<dyn Signer>,
}

fn default_signer() -> Arc<dyn Signer> {
    Arc::new(QingStorSigner)
}

impl OperationContext {
    /// Service name, used in logs.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Operation name, used in logs.
    #[must_use]
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Endpoint path template.
    #[must_use]
    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    /// The zone this call targets: the operation's own, else the configured default.
    #[must_use]
    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref().or(self.config.zone.as_ref())
    }

    /// Credential source.
    #[must_use]
    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Client configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    /// Request signer.
    #[must_use]
    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("service_name", &self.service_name)
            .field("operation_name", &self.operation_name)
            .field("method", &self.method)
            .field("path_template", &self.path_template)
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}
