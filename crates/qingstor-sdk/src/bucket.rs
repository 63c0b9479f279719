//! Bucket handles.

use std::fmt;
use std::sync::Arc;

use http::Method;
use qingstor_auth::CredentialProvider;
use qingstor_core::{ClientConfig, Zone};
use qingstor_request::{Callback, Dispatcher, OperationContext, RequestError, RequestHandler};

use crate::model::{
    GetBucketAclInput, GetBucketAclOutput, GetObjectInput, GetObjectOutput, HeadObjectInput,
    HeadObjectOutput, ListObjectsInput, ListObjectsOutput, PutBucketAclInput, PutBucketAclOutput,
    PutObjectInput, PutObjectOutput,
};

const BUCKET_PATH: &str = "/<bucket-name>";
const OBJECT_PATH: &str = "/<bucket-name>/<object-key>";
const ACL_PATH: &str = "/<bucket-name>?acl";

/// Operations on one bucket.
///
/// Obtained from [`crate::QingStor::get_bucket`]. Every operation comes in
/// three forms: a blocking call, a `_request` form returning the prepared
/// [`RequestHandler`] (for futures, presigning, cancellation and progress),
/// and an `_async` form delivering the result to a callback.
#[derive(Clone)]
pub struct Bucket {
    name: String,
    zone: Option<Zone>,
    config: Arc<ClientConfig>,
    credentials: Arc<dyn CredentialProvider>,
    dispatcher: Dispatcher,
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("name", &self.name)
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

impl Bucket {
    pub(crate) fn new(
        name: String,
        zone: Option<Zone>,
        config: Arc<ClientConfig>,
        credentials: Arc<dyn CredentialProvider>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            name,
            zone,
            config,
            credentials,
            dispatcher,
        }
    }

    /// Bucket name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zone the bucket is addressed in, when one was given.
    #[must_use]
    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    fn context(
        &self,
        service_name: &str,
        operation_name: &str,
        method: Method,
        path_template: &str,
    ) -> OperationContext {
        OperationContext::builder()
            .service_name(service_name)
            .operation_name(operation_name)
            .method(method)
            .path_template(path_template)
            .zone(self.zone.clone())
            .credentials(Arc::clone(&self.credentials))
            .config(Arc::clone(&self.config))
            .build()
    }

    // ListObjects

    /// List objects in the bucket.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn list_objects(&self, input: ListObjectsInput) -> Result<ListObjectsOutput, RequestError> {
        self.list_objects_request(input).send()
    }

    /// Prepare a ListObjects call.
    #[must_use]
    pub fn list_objects_request(
        &self,
        mut input: ListObjectsInput,
    ) -> RequestHandler<ListObjectsInput, ListObjectsOutput> {
        input.bucket_name = Some(self.name.clone());
        let ctx = self.context(
            "GET Bucket (List Objects)",
            "ListObjects",
            Method::GET,
            BUCKET_PATH,
        );
        RequestHandler::new(ctx, input, self.dispatcher.clone())
    }

    /// List objects on a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, or a
    /// construction error.
    pub fn list_objects_async(
        &self,
        input: ListObjectsInput,
        callback: Option<Callback<ListObjectsOutput>>,
    ) -> Result<(), RequestError> {
        self.list_objects_request(input).send_async(callback)
    }

    // HeadObject

    /// Fetch the metadata of `object_key`.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn head_object(
        &self,
        object_key: &str,
        input: HeadObjectInput,
    ) -> Result<HeadObjectOutput, RequestError> {
        self.head_object_request(object_key, input).send()
    }

    /// Prepare a HeadObject call.
    #[must_use]
    pub fn head_object_request(
        &self,
        object_key: &str,
        mut input: HeadObjectInput,
    ) -> RequestHandler<HeadObjectInput, HeadObjectOutput> {
        input.bucket_name = Some(self.name.clone());
        input.object_key = Some(object_key.to_owned());
        let ctx = self.context("HEAD Object", "HeadObject", Method::HEAD, OBJECT_PATH);
        RequestHandler::new(ctx, input, self.dispatcher.clone())
    }

    /// Fetch object metadata on a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, or a
    /// construction error.
    pub fn head_object_async(
        &self,
        object_key: &str,
        input: HeadObjectInput,
        callback: Option<Callback<HeadObjectOutput>>,
    ) -> Result<(), RequestError> {
        self.head_object_request(object_key, input)
            .send_async(callback)
    }

    // GetObject

    /// Download `object_key`.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn get_object(
        &self,
        object_key: &str,
        input: GetObjectInput,
    ) -> Result<GetObjectOutput, RequestError> {
        self.get_object_request(object_key, input).send()
    }

    /// Prepare a GetObject call.
    #[must_use]
    pub fn get_object_request(
        &self,
        object_key: &str,
        mut input: GetObjectInput,
    ) -> RequestHandler<GetObjectInput, GetObjectOutput> {
        input.bucket_name = Some(self.name.clone());
        input.object_key = Some(object_key.to_owned());
        let ctx = self.context("GET Object", "GetObject", Method::GET, OBJECT_PATH);
        RequestHandler::new(ctx, input, self.dispatcher.clone())
    }

    /// Download an object on a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, or a
    /// construction error.
    pub fn get_object_async(
        &self,
        object_key: &str,
        input: GetObjectInput,
        callback: Option<Callback<GetObjectOutput>>,
    ) -> Result<(), RequestError> {
        self.get_object_request(object_key, input)
            .send_async(callback)
    }

    // PutObject

    /// Upload `object_key`.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn put_object(
        &self,
        object_key: &str,
        input: PutObjectInput,
    ) -> Result<PutObjectOutput, RequestError> {
        self.put_object_request(object_key, input).send()
    }

    /// Prepare a PutObject call.
    #[must_use]
    pub fn put_object_request(
        &self,
        object_key: &str,
        mut input: PutObjectInput,
    ) -> RequestHandler<PutObjectInput, PutObjectOutput> {
        input.bucket_name = Some(self.name.clone());
        input.object_key = Some(object_key.to_owned());
        let ctx = self.context("PUT Object", "PutObject", Method::PUT, OBJECT_PATH);
        RequestHandler::new(ctx, input, self.dispatcher.clone())
    }

    /// Upload an object on a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, or a
    /// construction error.
    pub fn put_object_async(
        &self,
        object_key: &str,
        input: PutObjectInput,
        callback: Option<Callback<PutObjectOutput>>,
    ) -> Result<(), RequestError> {
        self.put_object_request(object_key, input)
            .send_async(callback)
    }

    // GetBucketACL

    /// Fetch the bucket ACL.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn get_acl(&self, input: GetBucketAclInput) -> Result<GetBucketAclOutput, RequestError> {
        self.get_acl_request(input).send()
    }

    /// Prepare a GetBucketACL call.
    #[must_use]
    pub fn get_acl_request(
        &self,
        mut input: GetBucketAclInput,
    ) -> RequestHandler<GetBucketAclInput, GetBucketAclOutput> {
        input.bucket_name = Some(self.name.clone());
        let ctx = self.context("GET Bucket ACL", "GetBucketACL", Method::GET, ACL_PATH);
        RequestHandler::new(ctx, input, self.dispatcher.clone())
    }

    /// Fetch the bucket ACL on a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, or a
    /// construction error.
    pub fn get_acl_async(
        &self,
        input: GetBucketAclInput,
        callback: Option<Callback<GetBucketAclOutput>>,
    ) -> Result<(), RequestError> {
        self.get_acl_request(input).send_async(callback)
    }

    // PutBucketACL

    /// Replace the bucket ACL.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn put_acl(&self, input: PutBucketAclInput) -> Result<PutBucketAclOutput, RequestError> {
        self.put_acl_request(input).send()
    }

    /// Prepare a PutBucketACL call.
    #[must_use]
    pub fn put_acl_request(
        &self,
        mut input: PutBucketAclInput,
    ) -> RequestHandler<PutBucketAclInput, PutBucketAclOutput> {
        input.bucket_name = Some(self.name.clone());
        let ctx = self.context("PUT Bucket ACL", "PutBucketACL", Method::PUT, ACL_PATH);
        RequestHandler::new(ctx, input, self.dispatcher.clone())
    }

    /// Replace the bucket ACL on a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, or a
    /// construction error.
    pub fn put_acl_async(
        &self,
        input: PutBucketAclInput,
        callback: Option<Callback<PutBucketAclOutput>>,
    ) -> Result<(), RequestError> {
        self.put_acl_request(input).send_async(callback)
    }
}
