//! Transfer progress reporting.

/// Receives byte counts as a call moves body chunks.
///
/// Called after every uploaded chunk and every downloaded chunk, on the
/// thread running the call. `total` is `None` when the response carries no
/// `Content-Length`.
pub trait ProgressListener: Send + Sync {
    /// `transferred` bytes of `total` have moved so far in this direction.
    fn on_progress(&self, transferred: u64, total: Option<u64>);
}

impl<F> ProgressListener for F
where
    F: Fn(u64, Option<u64>) + Send + Sync,
{
    fn on_progress(&self, transferred: u64, total: Option<u64>) {
        self(transferred, total);
    }
}
