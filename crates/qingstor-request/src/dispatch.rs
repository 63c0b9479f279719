//! Call dispatch: sign, transmit in chunks, decode.
//!
//! A [`Dispatcher`] drives one call through its states:
//!
//! ```text
//! Built -> Signing -> Transmitting -> Completed
//!             |            |-------> Failed
//!             |            `-------> Cancelled
//!             `-> Failed
//! ```
//!
//! Credentials are resolved and the request signed exactly once, right before
//! transmission. Bodies move in chunks of at most `chunk_size` bytes in both
//! directions and the caller's cancellation handler is polled before each
//! chunk. An aborted transfer always surfaces as [`RequestError::Cancelled`],
//! whatever I/O error the transport reports for it.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use qingstor_core::DEFAULT_CHUNK_SIZE;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::builder::{BuiltRequest, SignedRequest};
use crate::cancel::{CancellationHandler, CancellationMonitor};
use crate::context::OperationContext;
use crate::decode::decode;
use crate::error::RequestError;
use crate::field::ResponseOutput;
use crate::progress::ProgressListener;
use crate::transport::{Transport, TransportError, TransportRequest};

/// Upper bound on response buffer pre-allocation taken from `Content-Length`.
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

/// Async completion callback, invoked exactly once and never inline.
pub type Callback<O> = Box<dyn FnOnce(Result<O, RequestError>) + Send + 'static>;

/// Lifecycle of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// Request assembled, not yet signed.
    Built,
    /// Resolving credentials and signing.
    Signing,
    /// Body transfer in progress.
    Transmitting,
    /// Response decoded into an output.
    Completed,
    /// The call ended with an error other than cancellation.
    Failed,
    /// The caller cancelled the transfer.
    Cancelled,
}

impl CallState {
    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Built, Self::Signing | Self::Failed)
                | (Self::Signing, Self::Transmitting | Self::Failed)
                | (
                    Self::Transmitting,
                    Self::Completed | Self::Failed | Self::Cancelled
                )
        )
    }

    /// Whether the call has ended.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Move to `next` if the transition is legal. Terminal states never change.
    ///
    /// Returns whether the state changed.
    pub fn advance(&mut self, next: Self) -> bool {
        if !self.can_transition_to(next) {
            return false;
        }
        debug!(from = ?*self, to = ?next, "call state transition");
        *self = next;
        true
    }
}

/// Per-call options.
#[derive(Clone, Default)]
pub struct CallOptions {
    /// Polled before every body chunk.
    pub cancellation: Option<Arc<dyn CancellationHandler>>,
    /// Told about every transferred chunk.
    pub progress: Option<Arc<dyn ProgressListener>>,
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("cancellation", &self.cancellation.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Sends built requests over a [`Transport`].
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    chunk_size: usize,
    runtime: Option<Handle>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("chunk_size", &self.chunk_size)
            .field("runtime", &self.runtime.is_some())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Create a dispatcher with the default chunk size.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            chunk_size: DEFAULT_CHUNK_SIZE,
            runtime: None,
        }
    }

    /// Set the body chunk size. Zero is treated as one byte.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run async calls on `handle`'s blocking pool instead of the ambient runtime.
    #[must_use]
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// The body chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Sign, transmit and decode on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Signing`], [`RequestError::Transport`],
    /// [`RequestError::Service`], [`RequestError::Decode`] or
    /// [`RequestError::Cancelled`].
    pub fn send_sync<O: ResponseOutput>(
        &self,
        request: BuiltRequest,
        ctx: &OperationContext,
        options: &CallOptions,
    ) -> Result<O, RequestError> {
        let monitor = CancellationMonitor::new(options.cancellation.clone());
        let mut state = CallState::Built;

        let result = self.run(request, ctx, options, &monitor, &mut state);

        let terminal = match &result {
            Ok(_) => CallState::Completed,
            Err(RequestError::Cancelled) => CallState::Cancelled,
            Err(_) => CallState::Failed,
        };
        state.advance(terminal);
        debug!(
            operation = ctx.operation_name(),
            state = ?state,
            polls = monitor.poll_count(),
            "call finished"
        );
        result
    }

    fn run<O: ResponseOutput>(
        &self,
        request: BuiltRequest,
        ctx: &OperationContext,
        options: &CallOptions,
        monitor: &CancellationMonitor,
        state: &mut CallState,
    ) -> Result<O, RequestError> {
        state.advance(CallState::Signing);
        let credentials = ctx.credentials().credentials()?;
        let signed = request.sign(ctx.signer().as_ref(), &credentials)?;

        state.advance(CallState::Transmitting);
        let (status, headers, body) = self.transmit(signed, monitor, options.progress.as_deref())?;

        decode(status, &headers, body, ctx.config().document_format)
    }

    fn transmit(
        &self,
        signed: SignedRequest,
        monitor: &CancellationMonitor,
        progress: Option<&dyn ProgressListener>,
    ) -> Result<(StatusCode, HeaderMap, Bytes), RequestError> {
        let payload = signed.body().to_bytes();
        let content_length = payload.len() as u64;
        let mut upload = ChunkedUpload {
            data: payload,
            offset: 0,
            chunk_size: self.chunk_size,
            monitor,
            progress,
        };

        debug!(
            operation = signed.operation_name(),
            method = %signed.method(),
            content_length,
            "transmitting request"
        );
        let is_head = *signed.method() == Method::HEAD;
        let outcome = self.transport.execute(TransportRequest {
            method: signed.method(),
            url: signed.url(),
            headers: signed.headers(),
            content_length,
            body: &mut upload,
        });
        // The signed request is spent by this transmission.
        drop(signed);

        let response = match outcome {
            Ok(response) => response,
            Err(_) if monitor.was_cancelled() => return Err(RequestError::Cancelled),
            Err(e) => return Err(e.into()),
        };
        if monitor.was_cancelled() {
            return Err(RequestError::Cancelled);
        }

        let total = expected_body_len(is_head, response.status, &response.headers);
        let body = self.download(response.body, total, monitor, progress)?;
        debug!(status = response.status.as_u16(), len = body.len(), "received response");

        Ok((response.status, response.headers, body))
    }

    fn download(
        &self,
        mut reader: Box<dyn Read>,
        total: Option<u64>,
        monitor: &CancellationMonitor,
        progress: Option<&dyn ProgressListener>,
    ) -> Result<Bytes, RequestError> {
        let capacity = total.map_or(0, |t| t.min(MAX_PREALLOCATION));
        let mut received = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
        let mut chunk = vec![0_u8; self.chunk_size];

        loop {
            // Fully received: later cancellation is a no-op.
            if total.is_some_and(|t| received.len() as u64 >= t) {
                break;
            }
            if monitor.poll() {
                debug!(received = received.len(), "download cancelled");
                return Err(RequestError::Cancelled);
            }
            match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    received.extend_from_slice(&chunk[..n]);
                    if let Some(listener) = progress {
                        listener.on_progress(received.len() as u64, total);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) if monitor.was_cancelled() => return Err(RequestError::Cancelled),
                Err(e) => return Err(TransportError::Io(e).into()),
            }
        }

        Ok(Bytes::from(received))
    }

    /// Run the call on a worker and hand the result to `callback`.
    ///
    /// The call runs on the configured runtime's blocking pool, the ambient
    /// tokio runtime's, or a dedicated thread when neither exists. The
    /// callback is invoked exactly once, never before this method returns
    /// control to the worker. A job the runtime discards without running is
    /// reported to the callback as [`RequestError::Transport`].
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidArgument`] without scheduling anything if
    /// `callback` is `None`, or [`RequestError::Transport`] if no worker thread
    /// could be started.
    pub fn send_async<O: ResponseOutput>(
        &self,
        request: BuiltRequest,
        ctx: OperationContext,
        options: CallOptions,
        callback: Option<Callback<O>>,
    ) -> Result<(), RequestError> {
        let Some(callback) = callback else {
            return Err(RequestError::InvalidArgument(
                "callback must not be None".to_owned(),
            ));
        };

        let dispatcher = self.clone();
        let call = move || dispatcher.send_sync::<O>(request, &ctx, &options);

        match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(handle) => {
                let guard = CallbackGuard(Some(callback));
                drop(handle.spawn_blocking(move || guard.deliver(call())));
            }
            None => {
                std::thread::Builder::new()
                    .name("qingstor-call".to_owned())
                    .spawn(move || callback(call()))
                    .map_err(TransportError::Io)?;
            }
        }
        Ok(())
    }

    /// Future-based variant of [`Self::send_async`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::send_sync`]; a worker that dies without a result is
    /// reported as [`RequestError::Transport`].
    pub async fn send_future<O: ResponseOutput>(
        &self,
        request: BuiltRequest,
        ctx: OperationContext,
        options: CallOptions,
    ) -> Result<O, RequestError> {
        let dispatcher = self.clone();
        let job = move || dispatcher.send_sync::<O>(request, &ctx, &options);

        match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(handle) => handle.spawn_blocking(job).await.map_err(|e| {
                RequestError::Transport(TransportError::Other(format!("call task failed: {e}")))
            })?,
            None => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                std::thread::Builder::new()
                    .name("qingstor-call".to_owned())
                    .spawn(move || {
                        let _ = tx.send(job());
                    })
                    .map_err(TransportError::Io)?;
                rx.await.map_err(|_| {
                    RequestError::Transport(TransportError::Other(
                        "call thread exited without a result".to_owned(),
                    ))
                })?
            }
        }
    }
}

/// Length of the response body on the wire, when the response has one.
///
/// HEAD, 204 and 304 responses carry the object's `Content-Length` without
/// its bytes.
fn expected_body_len(is_head: bool, status: StatusCode, headers: &HeaderMap) -> Option<u64> {
    if is_head || matches!(status, StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED) {
        return None;
    }
    headers
        .get(http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
}

/// Owns an async callback until the worker delivers a result.
///
/// A job discarded without running (for instance by a runtime that has shut
/// down) drops the guard, which then reports the failure from a fresh thread.
struct CallbackGuard<O: ResponseOutput>(Option<Callback<O>>);

impl<O: ResponseOutput> CallbackGuard<O> {
    fn deliver(mut self, result: Result<O, RequestError>) {
        if let Some(callback) = self.0.take() {
            callback(result);
        }
    }
}

impl<O: ResponseOutput> Drop for CallbackGuard<O> {
    fn drop(&mut self) {
        let Some(callback) = self.0.take() else {
            return;
        };
        warn!("async call dropped before it ran");
        let spawned = std::thread::Builder::new()
            .name("qingstor-call".to_owned())
            .spawn(move || {
                callback(Err(RequestError::Transport(TransportError::Other(
                    "call dropped before it ran".to_owned(),
                ))));
            });
        if let Err(e) = spawned {
            warn!(error = %e, "could not start a thread to report the dropped call");
        }
    }
}

/// Request body reader that yields at most one chunk per read and polls the
/// cancellation monitor before each one.
struct ChunkedUpload<'a> {
    data: Bytes,
    offset: usize,
    chunk_size: usize,
    monitor: &'a CancellationMonitor,
    progress: Option<&'a dyn ProgressListener>,
}

impl Read for ChunkedUpload<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.data.len() - self.offset;
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        if self.monitor.poll() {
            debug!(sent = self.offset, "upload cancelled");
            return Err(io::Error::other(RequestError::Cancelled.to_string()));
        }

        let n = remaining.min(self.chunk_size).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        if let Some(listener) = self.progress {
            listener.on_progress(self.offset as u64, Some(self.data.len() as u64));
        }
        Ok(n)
    }
}
