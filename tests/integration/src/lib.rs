//! End-to-end tests for the QingStor SDK.
//!
//! Every test drives the full pipeline (routing, building, signing,
//! dispatch and decoding) through an in-process [`StubTransport`], so no
//! network access or running service is needed.
//!
//! Run them with:
//! ```text
//! cargo test -p qingstor-integration
//! ```

use std::collections::VecDeque;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use qingstor_request::{Transport, TransportError, TransportRequest, TransportResponse};
use qingstor_sdk::{ClientConfig, QingStor, StaticCredentialProvider};
use tracing::debug;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// One request as the transport received it.
#[derive(Debug, Clone)]
pub struct Captured {
    /// HTTP method.
    pub method: Method,
    /// Full URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Declared body length.
    pub content_length: u64,
    /// Size of every body read that returned data, in order.
    pub chunks: Vec<usize>,
    /// Body bytes received before the upload ended or failed.
    pub body: Vec<u8>,
}

/// How the stub answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A fixed response, with its body served in reads of at most `read_size` bytes.
    Fixed {
        /// Response status.
        status: StatusCode,
        /// Response headers.
        headers: HeaderMap,
        /// Response body.
        body: Bytes,
        /// Largest slice one body read returns.
        read_size: usize,
    },
    /// Reflect the request: `x-qs-*` headers come back as response headers
    /// and the request body comes back as the response body.
    Echo,
}

/// A [`Transport`] that records requests and answers from memory.
#[derive(Debug)]
pub struct StubTransport {
    reply: Reply,
    calls: AtomicUsize,
    captured: Mutex<Vec<Captured>>,
}

impl StubTransport {
    /// Answer every request with `status` and a JSON `body`.
    #[must_use]
    pub fn json(status: StatusCode, body: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        headers.insert("x-qs-request-id", http::HeaderValue::from_static("stub-request"));
        Self::fixed(status, headers, Bytes::from(body.to_owned()))
    }

    /// Answer every request with the given parts.
    #[must_use]
    pub fn fixed(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self::new(Reply::Fixed {
            status,
            headers,
            body,
            read_size: usize::MAX,
        })
    }

    /// Answer every request by reflecting it.
    #[must_use]
    pub fn echo() -> Self {
        Self::new(Reply::Echo)
    }

    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Serve response bodies in reads of at most `read_size` bytes.
    #[must_use]
    pub fn with_read_size(mut self, size: usize) -> Self {
        if let Reply::Fixed { read_size, .. } = &mut self.reply {
            *read_size = size;
        }
        self
    }

    /// Number of `execute` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received so far.
    #[must_use]
    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The most recent request.
    ///
    /// # Panics
    ///
    /// Panics if no request has been received.
    #[must_use]
    pub fn last(&self) -> Captured {
        self.captured()
            .pop()
            .unwrap_or_else(|| panic!("transport received no request"))
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: TransportRequest<'_>) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(method = %request.method, url = %request.url, "stub transport received request");

        let mut captured = Captured {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            content_length: request.content_length,
            chunks: Vec::new(),
            body: Vec::new(),
        };
        let mut buf = vec![0_u8; 1 << 20];
        let upload = loop {
            match request.body.read(&mut buf) {
                Ok(0) => break Ok(()),
                Ok(n) => {
                    captured.chunks.push(n);
                    captured.body.extend_from_slice(&buf[..n]);
                }
                Err(e) => break Err(e),
            }
        };
        let echoed = captured.clone();
        if let Ok(mut all) = self.captured.lock() {
            all.push(captured);
        }
        upload?;

        match &self.reply {
            Reply::Fixed {
                status,
                headers,
                body,
                read_size,
            } => Ok(TransportResponse {
                status: *status,
                headers: headers.clone(),
                body: Box::new(SlicedReader::new(body.clone(), *read_size)),
            }),
            Reply::Echo => {
                let mut headers: HeaderMap = echoed
                    .headers
                    .iter()
                    .filter(|(name, _)| name.as_str().starts_with("x-qs-"))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                if let Some(content_type) = echoed.headers.get(http::header::CONTENT_TYPE) {
                    headers.insert(http::header::CONTENT_TYPE, content_type.clone());
                }
                headers.insert(http::header::CONTENT_LENGTH, echoed.body.len().into());
                Ok(TransportResponse {
                    status: StatusCode::OK,
                    headers,
                    body: Box::new(Cursor::new(echoed.body)),
                })
            }
        }
    }
}

/// A reader returning at most `read_size` bytes per call.
#[derive(Debug)]
struct SlicedReader {
    data: VecDeque<u8>,
    read_size: usize,
}

impl SlicedReader {
    fn new(data: Bytes, read_size: usize) -> Self {
        Self {
            data: data.iter().copied().collect(),
            read_size: read_size.max(1),
        }
    }
}

impl Read for SlicedReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.data.len().min(buf.len()).min(self.read_size);
        for (slot, byte) in buf.iter_mut().zip(self.data.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// A cancellation handler that reports cancelled from its `n`th poll on.
///
/// Returns the handler together with a counter of polls made so far.
#[must_use]
pub fn cancel_on_poll(n: usize) -> (impl Fn() -> bool + Send + Sync + 'static, Arc<AtomicUsize>) {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&polls);
    let handler = move || counter.fetch_add(1, Ordering::SeqCst) + 1 >= n;
    (handler, polls)
}

/// A client in zone `pek3a` using `chunk_size`-byte body chunks.
///
/// # Panics
///
/// Panics if the test configuration is rejected.
#[must_use]
pub fn service(transport: &Arc<StubTransport>, chunk_size: usize) -> QingStor {
    service_with(transport, ClientConfig::builder().chunk_size(chunk_size).build())
}

/// A client in zone `pek3a` using `config`.
///
/// # Panics
///
/// Panics if `config` is rejected.
#[must_use]
pub fn service_with(transport: &Arc<StubTransport>, config: ClientConfig) -> QingStor {
    init_tracing();

    let transport: Arc<dyn Transport> = transport.clone();
    QingStor::with_transport(
        config,
        StaticCredentialProvider::new("QYACCESSKEYIDEXAMPLE", "SECRETACCESSKEY"),
        transport,
    )
    .unwrap_or_else(|e| panic!("test configuration rejected: {e}"))
    .with_zone(qingstor_sdk::Zone::new("pek3a").unwrap_or_else(|e| panic!("{e}")))
}

mod test_async;
mod test_cancel;
mod test_error;
mod test_object;
mod test_service;
