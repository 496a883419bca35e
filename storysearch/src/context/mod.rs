//! Execution contexts used by the search dispatcher.
//!
//! The dispatcher never decides *where* code runs. It receives two contexts:
//!
//! - a [`BackgroundExecutor`] that runs the fetch (and the raw-to-domain
//!   mapping) off the caller's path
//! - a [`ForegroundExecutor`] that runs result deliveries on a single logical
//!   context, the equivalent of a UI/main thread
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  invoke   ┌──────────────────┐  spawn   ┌────────────────────┐
//! │    Caller    │──────────►│ SearchDispatcher │─────────►│ BackgroundExecutor │
//! └──────────────┘           └──────────────────┘          └─────────┬──────────┘
//!        ▲                                                           │ run(delivery)
//!        │ callback                                                  ▼
//!        │                                                 ┌────────────────────┐
//!        └─────────────────────────────────────────────────│ ForegroundExecutor │
//!                                                          └────────────────────┘
//! ```
//!
//! Production wiring uses [`TokioBackground`] with a [`ChannelForeground`]
//! drained by a [`ForegroundLoop`]. Tests and headless callers can use
//! [`InlineForeground`] instead.

mod background;
mod foreground;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

pub use background::TokioBackground;
pub use foreground::{ChannelForeground, ForegroundLoop, InlineForeground};

/// Boxed future spawned on the background context.
pub type BackgroundTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Unit of work executed on the foreground context.
pub type Delivery = Box<dyn FnOnce() + Send + 'static>;

/// Errors raised by execution contexts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The foreground loop has stopped; the delivery was dropped.
    #[error("foreground context has shut down")]
    ForegroundClosed,
}

/// Runs fetch work away from the foreground context.
pub trait BackgroundExecutor: Send + Sync + 'static {
    /// Spawns a task. The task runs to completion (or until it observes its
    /// own cancellation); the executor keeps no handle to it.
    fn spawn(&self, task: BackgroundTask);
}

/// Runs deliveries on a single logical context.
pub trait ForegroundExecutor: Send + Sync + 'static {
    /// Schedules `delivery` on the foreground context.
    ///
    /// The returned future resolves once the delivery has run, mirroring a
    /// "switch to foreground, run, switch back" step in the calling task.
    fn run(
        &self,
        delivery: Delivery,
    ) -> Pin<Box<dyn Future<Output = Result<(), ContextError>> + Send + 'static>>;
}

/// The pair of contexts handed to a dispatcher.
#[derive(Clone)]
pub struct DispatchContexts {
    /// Context for fetch work.
    pub background: Arc<dyn BackgroundExecutor>,
    /// Context for callback delivery.
    pub foreground: Arc<dyn ForegroundExecutor>,
}

impl DispatchContexts {
    /// Bundles a background and a foreground context.
    pub fn new(
        background: Arc<dyn BackgroundExecutor>,
        foreground: Arc<dyn ForegroundExecutor>,
    ) -> Self {
        Self {
            background,
            foreground,
        }
    }

    /// Background on the current tokio runtime, deliveries inline.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn inline_on_current_runtime() -> Self {
        Self::new(
            Arc::new(TokioBackground::current()),
            Arc::new(InlineForeground),
        )
    }
}

impl std::fmt::Debug for DispatchContexts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContexts").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_error_display() {
        assert_eq!(
            ContextError::ForegroundClosed.to_string(),
            "foreground context has shut down"
        );
    }

    #[test]
    fn test_contexts_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DispatchContexts>();
    }
}
