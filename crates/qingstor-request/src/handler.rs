//! The per-call entry point tying routing, building and dispatch together.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::builder::{BuiltRequest, build};
use crate::cancel::CancellationHandler;
use crate::context::OperationContext;
use crate::dispatch::{CallOptions, Callback, Dispatcher};
use crate::error::RequestError;
use crate::field::{RequestInput, ResponseOutput};
use crate::progress::ProgressListener;
use crate::router::route;

/// One prepared call: an operation context, a typed input and the dispatcher
/// that will carry it.
///
/// Nothing is validated until the call is built, so every send method
/// reports construction failures (`MissingRequiredField`, `InvalidArgument`)
/// before any I/O happens.
pub struct RequestHandler<I, O> {
    ctx: OperationContext,
    input: I,
    dispatcher: Dispatcher,
    options: CallOptions,
    output: PhantomData<fn() -> O>,
}

impl<I: fmt::Debug, O> fmt::Debug for RequestHandler<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler")
            .field("ctx", &self.ctx)
            .field("input", &self.input)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<I, O> RequestHandler<I, O>
where
    I: RequestInput,
    O: ResponseOutput,
{
    /// Prepare a call.
    #[must_use]
    pub fn new(ctx: OperationContext, input: I, dispatcher: Dispatcher) -> Self {
        Self {
            ctx,
            input,
            dispatcher,
            options: CallOptions::default(),
            output: PhantomData,
        }
    }

    /// Poll `handler` before every body chunk of this call.
    #[must_use]
    pub fn with_cancellation(mut self, handler: impl CancellationHandler + 'static) -> Self {
        self.options.cancellation = Some(Arc::new(handler));
        self
    }

    /// Report transferred bytes of this call to `listener`.
    #[must_use]
    pub fn with_progress(mut self, listener: impl ProgressListener + 'static) -> Self {
        self.options.progress = Some(Arc::new(listener));
        self
    }

    /// The operation context.
    #[must_use]
    pub fn context(&self) -> &OperationContext {
        &self.ctx
    }

    /// The typed input.
    #[must_use]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Route the input and assemble the unsigned request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::MissingRequiredField`] or
    /// [`RequestError::InvalidArgument`].
    pub fn build(&self) -> Result<BuiltRequest, RequestError> {
        let routed = route(&self.input, self.ctx.config().document_format)?;
        build(&self.ctx, routed)
    }

    /// Run the call on the current thread.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub fn send(self) -> Result<O, RequestError> {
        let request = self.build()?;
        self.dispatcher.send_sync(request, &self.ctx, &self.options)
    }

    /// Run the call on a worker; `callback` receives the result exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] if `callback` is `None`, and
    /// construction errors directly. In every error case nothing is scheduled
    /// and the callback is never invoked.
    pub fn send_async(self, callback: Option<Callback<O>>) -> Result<(), RequestError> {
        if callback.is_none() {
            return Err(RequestError::InvalidArgument(
                "callback must not be None".to_owned(),
            ));
        }
        let request = self.build()?;
        self.dispatcher
            .send_async(request, self.ctx, self.options, callback)
    }

    /// Run the call on a worker and await its result.
    ///
    /// # Errors
    ///
    /// Any [`RequestError`].
    pub async fn send_future(self) -> Result<O, RequestError> {
        let request = self.build()?;
        self.dispatcher
            .send_future(request, self.ctx, self.options)
            .await
    }

    /// A URL granting this call's access until `expires_at` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Construction errors, or [`RequestError::Signing`] if credentials are
    /// unavailable or the expiry is invalid.
    pub fn presigned_url(&self, expires_at: i64) -> Result<String, RequestError> {
        let request = self.build()?;
        let credentials = self.ctx.credentials().credentials()?;
        request.presigned_url(self.ctx.signer().as_ref(), &credentials, expires_at)
    }
}
