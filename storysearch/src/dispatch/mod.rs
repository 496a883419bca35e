//! Keyed, cancellable search dispatch.
//!
//! # Responsibilities
//!
//! - **Request identity**: [`RequestKey`] (`"<query>::<page>"`)
//! - **Tracking**: [`RequestTracker`] maps keys to [`InFlightHandle`]s
//! - **Dispatch**: [`SearchDispatcher`] spawns fetches on the background
//!   context and delivers [`SearchResult`]s on the foreground context
//!
//! # Lifecycle
//!
//! ```text
//! invoke ──► track(key) ──► spawn ──► repository.search ──┬─► release(key) ──► map ──► foreground ──► callback
//!                                           ▲             │
//!            cancel(key) / cancel_all ──────┘ (token)     └─► cancelled: release(key), no callback
//! ```
//!
//! # Design Decisions
//!
//! - One root cancellation token per tracker; every request holds a child
//! - `cancel_all` swaps the root and clears the map under one lock
//! - Re-invoking a key replaces its entry without cancelling the prior task
//! - A finishing task only removes its own entry, never a successor's
//! - Cancellation is re-checked on the foreground right before the callback

mod config;
mod dispatcher;
mod envelope;
mod handle;
mod key;
mod repository;
mod tracker;

pub use config::{DispatcherConfig, DEFAULT_RECHECK_BEFORE_DELIVERY};
pub use dispatcher::SearchDispatcher;
pub use envelope::{ResultEnvelope, SearchResult};
pub use handle::{InFlightHandle, RequestId};
pub use key::{KeyParseError, RequestKey, KEY_SEPARATOR};
pub use repository::{ItemMapper, SearchRepository};
pub use tracker::{RequestTracker, TrackerStats};
