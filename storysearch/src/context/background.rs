//! Tokio-backed background context.

use super::{BackgroundExecutor, BackgroundTask};
use tokio::runtime::Handle;

/// Spawns background work on a tokio runtime.
///
/// Holding a [`Handle`] rather than relying on the ambient runtime lets the
/// dispatcher be driven from threads that are not themselves inside tokio.
#[derive(Clone, Debug)]
pub struct TokioBackground {
    handle: Handle,
}

impl TokioBackground {
    /// Creates a background context on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates a background context on the runtime of the calling task.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl BackgroundExecutor for TokioBackground {
    fn spawn(&self, task: BackgroundTask) {
        // Detached: cancellation goes through the request's token, not the
        // join handle.
        drop(self.handle.spawn(task));
    }
}
