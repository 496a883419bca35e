//! Keyed registry of in-flight requests.
//!
//! The tracker maps each [`RequestKey`] to the [`InFlightHandle`] of the most
//! recent task started for it. Entries are inserted on the invoking path and
//! removed by completing tasks, possibly from different threads, so the map is
//! a `DashMap`.
//!
//! Every handle is a child of one root token. Cancelling everything cancels the
//! root and installs a fresh one; the root lives behind a mutex that is also
//! held while issuing and registering handles, which makes `cancel_all`
//! atomic with respect to concurrent registration.

use super::handle::{InFlightHandle, RequestId};
use super::key::RequestKey;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Registry of in-flight requests for one dispatcher.
pub struct RequestTracker {
    /// Live handles indexed by key
    entries: DashMap<RequestKey, InFlightHandle>,
    /// Parent of every issued handle
    root: Mutex<CancellationToken>,
    /// Handles registered (lifetime counter)
    registered: AtomicU64,
    /// Entries replaced by a newer handle for the same key
    superseded: AtomicU64,
    /// Entries released by their own task after the fetch finished
    released: AtomicU64,
    /// Entries removed through `cancel` or `cancel_all`
    cancelled: AtomicU64,
}

impl RequestTracker {
    /// Creates an empty tracker with a fresh root token.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            root: Mutex::new(CancellationToken::new()),
            registered: AtomicU64::new(0),
            superseded: AtomicU64::new(0),
            released: AtomicU64::new(0),
            cancelled: AtomicU64::new(0),
        }
    }

    /// Issues a handle under the current root without registering it.
    pub fn issue(&self) -> InFlightHandle {
        InFlightHandle::new(self.root.lock().child_token())
    }

    /// Issues a handle and registers it under `key` in one step.
    ///
    /// Any existing entry for `key` is replaced but not cancelled.
    pub fn track(&self, key: RequestKey) -> InFlightHandle {
        let root = self.root.lock();
        let handle = InFlightHandle::new(root.child_token());
        self.insert(key, handle.clone());
        handle
    }

    /// Stores `handle` under `key`, replacing any existing entry.
    ///
    /// The superseded handle is returned, not cancelled: its task keeps
    /// running and can no longer be reached through [`cancel`](Self::cancel).
    /// A handle that is already cancelled (for instance issued before a
    /// [`cancel_all`](Self::cancel_all)) is not stored.
    pub fn register(&self, key: RequestKey, handle: InFlightHandle) -> Option<InFlightHandle> {
        let _root = self.root.lock();
        if handle.is_cancelled() {
            tracing::debug!(
                key = %key,
                request_id = %handle.id(),
                "Skipped registering cancelled request"
            );
            return None;
        }
        self.insert(key, handle)
    }

    // Callers hold the root lock.
    fn insert(&self, key: RequestKey, handle: InFlightHandle) -> Option<InFlightHandle> {
        let request_id = handle.id();
        let previous = self.entries.insert(key.clone(), handle);
        self.registered.fetch_add(1, Ordering::Relaxed);

        match &previous {
            Some(old) => {
                self.superseded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    key = %key,
                    request_id = %request_id,
                    superseded_id = %old.id(),
                    "Registered request, superseding in-flight request"
                );
            }
            None => {
                tracing::debug!(key = %key, request_id = %request_id, "Registered request");
            }
        }
        previous
    }

    /// Removes the entry for `key` if present.
    ///
    /// Idempotent: removing an absent key does nothing.
    pub fn remove(&self, key: &RequestKey) -> Option<InFlightHandle> {
        let removed = self.entries.remove(key).map(|(_, handle)| handle);
        if let Some(handle) = &removed {
            tracing::trace!(key = %key, request_id = %handle.id(), "Removed request");
        }
        removed
    }

    /// Completion-side removal.
    ///
    /// Removes the entry for `key` only while it still holds the handle with
    /// `id`, so a superseded task finishing late never evicts its successor.
    /// Returns true if the entry was removed.
    pub fn release(&self, key: &RequestKey, id: RequestId) -> bool {
        let removed = self
            .entries
            .remove_if(key, |_, handle| handle.id() == id)
            .is_some();
        if removed {
            self.released.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key = %key, request_id = %id, "Released request");
        }
        removed
    }

    /// Cancels and removes the entry for `key`.
    ///
    /// Returns true if a request was cancelled; absent keys are a no-op.
    pub fn cancel(&self, key: &RequestKey) -> bool {
        match self.entries.remove(key) {
            Some((_, handle)) => {
                handle.cancel();
                self.cancelled.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    key = %key,
                    request_id = %handle.id(),
                    elapsed_ms = handle.elapsed().as_millis(),
                    "Cancelled request"
                );
                true
            }
            None => false,
        }
    }

    /// Cancels every request issued so far.
    ///
    /// The root token is cancelled, which reaches every outstanding handle
    /// including superseded ones, and a fresh root is installed so requests
    /// issued afterwards run normally. Entries belonging to the old root are
    /// cleared before returning. Returns the number of entries cleared.
    pub fn cancel_all(&self) -> usize {
        let mut root = self.root.lock();
        let old_root = std::mem::replace(&mut *root, CancellationToken::new());
        old_root.cancel();

        let before = self.entries.len();
        // Everything in the map was issued from the old root while we hold
        // the lock, so every entry is now cancelled.
        self.entries.retain(|_, handle| !handle.is_cancelled());
        let cleared = before.saturating_sub(self.entries.len());
        drop(root);

        self.cancelled.fetch_add(cleared as u64, Ordering::Relaxed);
        tracing::debug!(cleared, "Cancelled all requests");
        cleared
    }

    /// Returns true if `key` has a live entry.
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the handle currently registered under `key`.
    pub fn get(&self, key: &RequestKey) -> Option<InFlightHandle> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Number of live entries.
    #[inline]
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }

    /// Keys with live entries, in no particular order.
    pub fn active_keys(&self) -> Vec<RequestKey> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Returns a snapshot of tracker statistics.
    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            active: self.entries.len(),
            registered: self.registered.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTracker")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Snapshot of tracker statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Currently tracked requests
    pub active: usize,
    /// Requests registered (lifetime)
    pub registered: u64,
    /// Registrations that replaced a live entry
    pub superseded: u64,
    /// Entries removed by their own task on completion
    pub released: u64,
    /// Entries removed by cancellation
    pub cancelled: u64,
}
