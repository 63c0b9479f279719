//! Caller-driven cancellation.
//!
//! A [`CancellationHandler`] is a polled predicate. The dispatcher asks it
//! before every body chunk; it is never pushed a notification and never
//! mutated by the pipeline. Any `Fn() -> bool` closure is a handler, and
//! [`CancellationFlag`] is a ready-made one callers can flip from another
//! thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A polled "should this transfer stop?" signal.
pub trait CancellationHandler: Send + Sync {
    /// Whether the call should stop at the next chunk boundary.
    fn is_cancelled(&self) -> bool;
}

impl<F> CancellationHandler for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A shareable cancellation switch.
///
/// # Examples
///
/// ```
/// use qingstor_request::{CancellationFlag, CancellationHandler};
///
/// let flag = CancellationFlag::new();
/// let observer = flag.clone();
/// assert!(!observer.is_cancelled());
/// flag.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create a flag that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancellationHandler for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Polls a call's handler and remembers the outcome.
///
/// Once the handler has reported cancellation, the monitor stays cancelled,
/// so an I/O error raised by the aborted transfer is still attributed to the
/// caller.
#[derive(Clone, Default)]
pub(crate) struct CancellationMonitor {
    handler: Option<Arc<dyn CancellationHandler>>,
    tripped: Arc<AtomicBool>,
    polls: Arc<AtomicU64>,
}

impl std::fmt::Debug for CancellationMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationMonitor")
            .field("has_handler", &self.handler.is_some())
            .field("tripped", &self.tripped.load(Ordering::SeqCst))
            .finish()
    }
}

impl CancellationMonitor {
    pub(crate) fn new(handler: Option<Arc<dyn CancellationHandler>>) -> Self {
        Self {
            handler,
            tripped: Arc::new(AtomicBool::new(false)),
            polls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Ask the handler, latching a positive answer.
    pub(crate) fn poll(&self) -> bool {
        if self.tripped.load(Ordering::SeqCst) {
            return true;
        }
        let Some(handler) = &self.handler else {
            return false;
        };
        self.polls.fetch_add(1, Ordering::Relaxed);
        if handler.is_cancelled() {
            self.tripped.store(true, Ordering::SeqCst);
            return true;
        }
        false
    }

    /// Whether cancellation has been observed, without polling again.
    pub(crate) fn was_cancelled(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    pub(crate) fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }
}
