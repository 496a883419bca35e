//! Foreground contexts: where result callbacks run.

use super::{ContextError, Delivery, ForegroundExecutor};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

type Queued = (Delivery, oneshot::Sender<()>);

/// Runs deliveries immediately on whichever task requests them.
///
/// Useful in tests and in headless programs that have no dedicated delivery
/// context.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineForeground;

impl ForegroundExecutor for InlineForeground {
    fn run(
        &self,
        delivery: Delivery,
    ) -> Pin<Box<dyn Future<Output = Result<(), ContextError>> + Send + 'static>> {
        delivery();
        Box::pin(std::future::ready(Ok(())))
    }
}

/// Foreground context backed by a channel.
///
/// Deliveries are queued and executed one at a time, in arrival order, by the
/// paired [`ForegroundLoop`].
///
/// # Example
///
/// ```ignore
/// let (foreground, event_loop) = ChannelForeground::new();
/// let shutdown = CancellationToken::new();
/// tokio::spawn(event_loop.run(shutdown.clone()));
/// ```
#[derive(Clone, Debug)]
pub struct ChannelForeground {
    tx: mpsc::UnboundedSender<Queued>,
}

impl ChannelForeground {
    /// Creates the sending side and the loop that drains it.
    pub fn new() -> (Self, ForegroundLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, ForegroundLoop { rx })
    }

    /// Returns true once the loop has stopped accepting deliveries.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ForegroundExecutor for ChannelForeground {
    fn run(
        &self,
        delivery: Delivery,
    ) -> Pin<Box<dyn Future<Output = Result<(), ContextError>> + Send + 'static>> {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send((delivery, ack_tx)).is_err() {
            return Box::pin(std::future::ready(Err(ContextError::ForegroundClosed)));
        }
        Box::pin(async move {
            // Dropped ack means the loop shut down with the delivery still queued.
            ack_rx.await.map_err(|_| ContextError::ForegroundClosed)
        })
    }
}

/// Single-consumer loop executing queued deliveries.
pub struct ForegroundLoop {
    rx: mpsc::UnboundedReceiver<Queued>,
}

impl ForegroundLoop {
    /// Runs deliveries until `shutdown` is cancelled or every
    /// [`ChannelForeground`] has been dropped.
    ///
    /// Returns the number of deliveries executed.
    pub async fn run(mut self, shutdown: CancellationToken) -> usize {
        let mut delivered = 0usize;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some((delivery, ack)) => {
                        delivery();
                        delivered += 1;
                        let _ = ack.send(());
                    }
                    None => break,
                },
            }
        }
        self.rx.close();
        tracing::debug!(delivered, "Foreground loop stopped");
        delivered
    }

    /// Executes every delivery queued right now and returns how many ran.
    ///
    /// Lets a caller that owns its own loop (a UI tick, a test) pump the
    /// foreground without spawning [`run`](Self::run).
    pub fn drain_pending(&mut self) -> usize {
        let mut delivered = 0usize;
        while let Ok((delivery, ack)) = self.rx.try_recv() {
            delivery();
            delivered += 1;
            let _ = ack.send(());
        }
        delivered
    }
}

impl std::fmt::Debug for ForegroundLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForegroundLoop").finish_non_exhaustive()
    }
}
