//! The search dispatcher: public entry point for keyed, cancellable searches.

use super::config::DispatcherConfig;
use super::envelope::{ResultEnvelope, SearchResult};
use super::handle::InFlightHandle;
use super::key::RequestKey;
use super::repository::{ItemMapper, SearchRepository};
use super::tracker::RequestTracker;
use crate::context::{Delivery, DispatchContexts, ForegroundExecutor};
use std::sync::Arc;
use tokio::sync::watch;

/// Starts searches in the background and delivers their results on the
/// foreground context.
///
/// Each request is tracked under its [`RequestKey`] until its fetch finishes,
/// so it can be cancelled individually or together with every other request
/// of this dispatcher.
///
/// # Example
///
/// ```ignore
/// let dispatcher = SearchDispatcher::new(Arc::new(repo), to_story, contexts);
///
/// dispatcher.invoke("cats", 1, |result, page, source| match result {
///     SearchResult::Success(stories) => show(stories, page, &source),
///     SearchResult::Error(cause) => report(cause, page, &source),
/// });
///
/// dispatcher.cancel_request_of_source("cats::1");
/// ```
pub struct SearchDispatcher<R, M>
where
    R: SearchRepository,
    M: ItemMapper<R::Item>,
{
    repository: Arc<R>,
    mapper: Arc<M>,
    contexts: DispatchContexts,
    tracker: Arc<RequestTracker>,
    config: DispatcherConfig,
    /// Spawned tasks that have not finished (fetch and delivery)
    pending: Arc<watch::Sender<usize>>,
}

impl<R, M> SearchDispatcher<R, M>
where
    R: SearchRepository,
    M: ItemMapper<R::Item>,
{
    /// Creates a dispatcher with the default configuration.
    pub fn new(repository: Arc<R>, mapper: M, contexts: DispatchContexts) -> Self {
        Self::with_config(repository, mapper, contexts, DispatcherConfig::default())
    }

    /// Creates a dispatcher with an explicit configuration.
    pub fn with_config(
        repository: Arc<R>,
        mapper: M,
        contexts: DispatchContexts,
        config: DispatcherConfig,
    ) -> Self {
        let (pending, _) = watch::channel(0usize);
        Self {
            repository,
            mapper: Arc::new(mapper),
            contexts,
            tracker: Arc::new(RequestTracker::new()),
            config,
            pending: Arc::new(pending),
        }
    }

    /// Searches `query` at `page` and reports the outcome through `on_result`.
    ///
    /// Fire-and-forget: nothing fails here. `on_result` runs on the
    /// foreground context exactly once, with `(result, page, query)`, unless
    /// the request is cancelled first. Invoking a key that is already in
    /// flight replaces its tracked handle without cancelling the earlier
    /// task; both may deliver.
    pub fn invoke<F>(&self, query: impl Into<String>, page: u32, on_result: F)
    where
        F: FnOnce(SearchResult<M::Output, R::Error>, u32, String) + Send + 'static,
    {
        let key = RequestKey::new(query, page);
        let handle = self.tracker.track(key.clone());

        let task = RequestTask {
            repository: Arc::clone(&self.repository),
            mapper: Arc::clone(&self.mapper),
            tracker: Arc::clone(&self.tracker),
            foreground: Arc::clone(&self.contexts.foreground),
            recheck_before_delivery: self.config.recheck_before_delivery(),
            key,
            handle,
            on_result,
            _pending: PendingGuard::new(Arc::clone(&self.pending)),
        };
        self.contexts.background.spawn(Box::pin(task.run()));
    }

    /// Cancels the request whose key has the string form `source`
    /// (`"<query>::<page>"`).
    ///
    /// Returns true if a tracked request was cancelled. Sources that are not
    /// a valid key name no request and are ignored.
    pub fn cancel_request_of_source(&self, source: &str) -> bool {
        match source.parse::<RequestKey>() {
            Ok(key) => self.cancel_request(&key),
            Err(e) => {
                tracing::debug!(source, error = %e, "Ignoring cancel for unparseable source");
                false
            }
        }
    }

    /// Cancels the request tracked under `key`, if any.
    pub fn cancel_request(&self, key: &RequestKey) -> bool {
        self.tracker.cancel(key)
    }

    /// Cancels every request this dispatcher has started.
    ///
    /// Returns the number of tracked entries cleared. Superseded tasks that
    /// were no longer tracked are cancelled as well.
    pub fn cancel_all_requests(&self) -> usize {
        self.tracker.cancel_all()
    }

    /// The request tracker.
    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// The dispatcher configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Number of spawned tasks that have not finished yet.
    ///
    /// Unlike [`RequestTracker::active_count`] this includes superseded and
    /// cancelled tasks still unwinding, and tasks waiting on delivery.
    pub fn pending_tasks(&self) -> usize {
        *self.pending.borrow()
    }

    /// Waits until every spawned task has finished.
    ///
    /// Deliveries go through the foreground context, so that context must be
    /// running for this to resolve.
    pub async fn wait_idle(&self) {
        let mut rx = self.pending.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|pending| *pending == 0).await;
    }
}

impl<R, M> std::fmt::Debug for SearchDispatcher<R, M>
where
    R: SearchRepository,
    M: ItemMapper<R::Item>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDispatcher")
            .field("tracker", &self.tracker)
            .field("config", &self.config)
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

/// Counts a spawned task for [`SearchDispatcher::wait_idle`].
///
/// Decrements on drop, so tasks that end early or are dropped unpolled are
/// accounted for.
struct PendingGuard(Arc<watch::Sender<usize>>);

impl PendingGuard {
    fn new(pending: Arc<watch::Sender<usize>>) -> Self {
        pending.send_modify(|n| *n += 1);
        Self(pending)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Everything one spawned request needs.
struct RequestTask<R, M, F> {
    repository: Arc<R>,
    mapper: Arc<M>,
    tracker: Arc<RequestTracker>,
    foreground: Arc<dyn ForegroundExecutor>,
    recheck_before_delivery: bool,
    key: RequestKey,
    handle: InFlightHandle,
    on_result: F,
    _pending: PendingGuard,
}

impl<R, M, F> RequestTask<R, M, F>
where
    R: SearchRepository,
    M: ItemMapper<R::Item>,
    F: FnOnce(SearchResult<M::Output, R::Error>, u32, String) + Send + 'static,
{
    async fn run(self) {
        let Self {
            repository,
            mapper,
            tracker,
            foreground,
            recheck_before_delivery,
            key,
            handle,
            on_result,
            _pending,
        } = self;

        let fetched = tokio::select! {
            biased;
            _ = handle.cancelled() => None,
            result = repository.search(key.query(), key.page()) => Some(result),
        };
        tracker.release(&key, handle.id());

        let fetched = match fetched {
            Some(fetched) => fetched,
            None => {
                tracing::trace!(
                    key = %key,
                    request_id = %handle.id(),
                    "Request cancelled during fetch"
                );
                return;
            }
        };
        if recheck_before_delivery && handle.is_cancelled() {
            tracing::trace!(
                key = %key,
                request_id = %handle.id(),
                "Request cancelled after fetch"
            );
            return;
        }

        let result = match fetched {
            Ok(raw) => {
                SearchResult::Success(raw.into_iter().map(|item| mapper.map(item)).collect())
            }
            Err(cause) => SearchResult::Error(cause),
        };
        let envelope = ResultEnvelope::new(result, key.page(), key.query());

        let request_id = handle.id();
        let delivery: Delivery = Box::new(move || {
            if recheck_before_delivery && handle.is_cancelled() {
                tracing::trace!(
                    request_id = %handle.id(),
                    "Dropped delivery for cancelled request"
                );
                return;
            }
            envelope.deliver(on_result);
        });

        if let Err(e) = foreground.run(delivery).await {
            tracing::debug!(
                key = %key,
                request_id = %request_id,
                error = %e,
                "Result delivery dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ChannelForeground, InlineForeground, TokioBackground};
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio_util::sync::CancellationToken;

    /// Repository answering `query` with `[query-page-0, query-page-1, ...]`
    /// after an optional delay, failing for the query "fail".
    struct EchoRepository {
        delay: Duration,
        items: usize,
    }

    impl SearchRepository for EchoRepository {
        type Item = String;
        type Error = String;

        fn search(
            &self,
            query: &str,
            page: u32,
        ) -> impl Future<Output = Result<Vec<String>, String>> + Send {
            let delay = self.delay;
            let items = self.items;
            let query = query.to_string();
            async move {
                tokio::time::sleep(delay).await;
                if query == "fail" {
                    return Err(format!("no results for {query}"));
                }
                Ok((0..items).map(|i| format!("{query}-{page}-{i}")).collect())
            }
        }
    }

    type Delivered = (SearchResult<usize, String>, u32, String);

    fn length(raw: String) -> usize {
        raw.len()
    }

    fn dispatcher(delay: Duration) -> SearchDispatcher<EchoRepository, fn(String) -> usize> {
        SearchDispatcher::new(
            Arc::new(EchoRepository { delay, items: 3 }),
            length as fn(String) -> usize,
            DispatchContexts::inline_on_current_runtime(),
        )
    }

    fn capture() -> (
        impl FnOnce(SearchResult<usize, String>, u32, String) + Send + 'static,
        oneshot::Receiver<Delivered>,
    ) {
        let (tx, rx) = oneshot::channel();
        (
            move |result: SearchResult<usize, String>, page: u32, source: String| {
                let _ = tx.send((result, page, source));
            },
            rx,
        )
    }

    #[tokio::test]
    async fn test_success_is_mapped_and_correlated() {
        let dispatcher = dispatcher(Duration::ZERO);
        let (callback, rx) = capture();

        dispatcher.invoke("cats", 2, callback);

        let (result, page, source) = rx.await.unwrap();
        // "cats-2-0".len() == 8
        assert_eq!(result, SearchResult::Success(vec![8, 8, 8]));
        assert_eq!(page, 2);
        assert_eq!(source, "cats");
    }

    #[tokio::test]
    async fn test_error_passes_through() {
        let dispatcher = dispatcher(Duration::ZERO);
        let (callback, rx) = capture();

        dispatcher.invoke("fail", 1, callback);

        let (result, page, source) = rx.await.unwrap();
        assert_eq!(result, SearchResult::Error("no results for fail".to_string()));
        assert_eq!(page, 1);
        assert_eq!(source, "fail");
    }

    #[tokio::test]
    async fn test_key_is_tracked_until_completion() {
        let dispatcher = dispatcher(Duration::from_millis(50));
        let (callback, rx) = capture();

        dispatcher.invoke("cats", 1, callback);
        assert!(dispatcher.tracker().contains(&RequestKey::new("cats", 1)));

        rx.await.unwrap();
        dispatcher.wait_idle().await;
        assert!(!dispatcher.tracker().contains(&RequestKey::new("cats", 1)));
        assert!(!dispatcher.cancel_request_of_source("cats::1"));
    }

    #[tokio::test]
    async fn test_cancelled_request_never_delivers() {
        let dispatcher = dispatcher(Duration::from_secs(30));
        let (callback, rx) = capture();

        dispatcher.invoke("cats", 1, callback);
        assert!(dispatcher.cancel_request_of_source("cats::1"));

        dispatcher.wait_idle().await;
        // Callback dropped without being called
        assert!(rx.await.is_err());
        assert_eq!(dispatcher.tracker().active_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_source_is_noop() {
        let dispatcher = dispatcher(Duration::from_millis(20));
        let (callback, rx) = capture();

        dispatcher.invoke("cats", 1, callback);
        assert!(!dispatcher.cancel_request_of_source("cats"));
        assert!(!dispatcher.cancel_request_of_source("cats::one"));

        assert!(rx.await.unwrap().0.is_success());
    }

    #[tokio::test]
    async fn test_recheck_drops_delivery_cancelled_on_foreground_queue() {
        let (foreground, mut event_loop) = ChannelForeground::new();
        let contexts = DispatchContexts::new(
            Arc::new(TokioBackground::current()),
            Arc::new(foreground),
        );
        let dispatcher = SearchDispatcher::new(
            Arc::new(EchoRepository {
                delay: Duration::ZERO,
                items: 1,
            }),
            length as fn(String) -> usize,
            contexts,
        );
        let delivered = Arc::new(Mutex::new(0));
        let delivered_clone = Arc::clone(&delivered);

        dispatcher.invoke("cats", 1, move |_, _, _| {
            *delivered_clone.lock().unwrap() += 1;
        });

        // Let the fetch finish; its delivery waits in the foreground queue.
        while dispatcher.tracker().active_count() > 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Key already released, so only cancel_all still reaches the handle.
        dispatcher.cancel_all_requests();
        while dispatcher.pending_tasks() > 0 {
            event_loop.drain_pending();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert_eq!(*delivered.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_requires_running_foreground() {
        let (foreground, event_loop) = ChannelForeground::new();
        let contexts = DispatchContexts::new(
            Arc::new(TokioBackground::current()),
            Arc::new(foreground),
        );
        let dispatcher = SearchDispatcher::new(
            Arc::new(EchoRepository {
                delay: Duration::ZERO,
                items: 2,
            }),
            length as fn(String) -> usize,
            contexts,
        );
        let (callback, rx) = capture();
        dispatcher.invoke("dogs", 4, callback);
        assert_eq!(dispatcher.pending_tasks(), 1);

        let shutdown = CancellationToken::new();
        let loop_task = tokio::spawn(event_loop.run(shutdown.clone()));

        tokio::time::timeout(Duration::from_secs(2), dispatcher.wait_idle())
            .await
            .unwrap();
        assert_eq!(dispatcher.pending_tasks(), 0);
        assert_eq!(rx.await.unwrap().0, SearchResult::Success(vec![8, 8]));

        shutdown.cancel();
        assert_eq!(loop_task.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_inline_foreground_contexts() {
        let contexts = DispatchContexts::new(
            Arc::new(TokioBackground::current()),
            Arc::new(InlineForeground),
        );
        let dispatcher = SearchDispatcher::with_config(
            Arc::new(EchoRepository {
                delay: Duration::ZERO,
                items: 0,
            }),
            length as fn(String) -> usize,
            contexts,
            DispatcherConfig::new().with_recheck_before_delivery(false),
        );
        let (callback, rx) = capture();

        dispatcher.invoke("empty", 1, callback);
        assert_eq!(rx.await.unwrap().0, SearchResult::Success(vec![]));
        assert!(!dispatcher.config().recheck_before_delivery());
    }
}
