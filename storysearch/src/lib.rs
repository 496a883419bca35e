//! storysearch - keyed, cancellable search request dispatching
//!
//! This library runs paged story searches on a background context, tracks
//! every in-flight request under a `query::page` key, and delivers mapped
//! results on a foreground context. Any tracked request, or all of them,
//! can be cancelled before its result reaches the caller.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use storysearch::context::{ChannelForeground, DispatchContexts, TokioBackground};
//! use storysearch::dispatch::SearchDispatcher;
//! use storysearch::story::to_story;
//!
//! let (foreground, foreground_loop) = ChannelForeground::new();
//! let contexts = DispatchContexts::new(
//!     Arc::new(TokioBackground::current()),
//!     Arc::new(foreground),
//! );
//! let dispatcher = SearchDispatcher::new(Arc::new(repository), to_story, contexts);
//!
//! dispatcher.invoke("rust", 1, |result, page, source| {
//!     println!("{source} page {page}: {}", result.is_success());
//! });
//! dispatcher.cancel_request_of_source("rust::1");
//! ```

pub mod config;
pub mod context;
pub mod dispatch;
pub mod logging;
pub mod story;

pub use context::{ContextError, DispatchContexts};
pub use dispatch::{RequestKey, SearchDispatcher, SearchResult};

/// Version of the storysearch library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
