//! In-flight request handles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one spawned request task.
///
/// Two invocations with the same [`RequestKey`](super::RequestKey) get
/// different ids, which is how the tracker tells a superseded handle from
/// the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a new unique request ID.
    pub fn new() -> Self {
        Self(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Cancellation handle bound to one spawned request task.
///
/// The token is a child of the tracker's root token, so cancelling the root
/// reaches every handle issued from it. Clones share the same token.
#[derive(Clone)]
pub struct InFlightHandle {
    id: RequestId,
    token: CancellationToken,
    issued_at: Instant,
}

impl InFlightHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            id: RequestId::new(),
            token,
            issued_at: Instant::now(),
        }
    }

    /// The request id.
    #[inline]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Requests cancellation. The task observes it at its next suspension
    /// point.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Time since the handle was issued.
    pub fn elapsed(&self) -> Duration {
        self.issued_at.elapsed()
    }
}

impl std::fmt::Debug for InFlightHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightHandle")
            .field("id", &self.id)
            .field("issued_at", &self.issued_at)
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}
