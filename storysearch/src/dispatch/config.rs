//! Dispatcher configuration.

/// Default for [`DispatcherConfig::recheck_before_delivery`].
pub const DEFAULT_RECHECK_BEFORE_DELIVERY: bool = true;

/// Configuration for a [`SearchDispatcher`](super::SearchDispatcher).
///
/// # Example
///
/// ```
/// use storysearch::dispatch::DispatcherConfig;
///
/// let config = DispatcherConfig::default();
/// assert!(config.recheck_before_delivery());
///
/// let config = DispatcherConfig::new().with_recheck_before_delivery(false);
/// assert!(!config.recheck_before_delivery());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Re-check cancellation on the foreground context right before the
    /// callback runs
    recheck_before_delivery: bool,
}

impl DispatcherConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether cancellation is re-checked immediately before delivery.
    ///
    /// When enabled, a request cancelled after its fetch finished but before
    /// the foreground ran its callback is dropped silently. When disabled,
    /// cancellation is only observed while the fetch is pending.
    /// Default: enabled.
    pub fn with_recheck_before_delivery(mut self, enabled: bool) -> Self {
        self.recheck_before_delivery = enabled;
        self
    }

    /// Whether cancellation is re-checked immediately before delivery.
    pub fn recheck_before_delivery(&self) -> bool {
        self.recheck_before_delivery
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            recheck_before_delivery: DEFAULT_RECHECK_BEFORE_DELIVERY,
        }
    }
}

impl From<&crate::config::DispatcherSettings> for DispatcherConfig {
    fn from(settings: &crate::config::DispatcherSettings) -> Self {
        Self::new().with_recheck_before_delivery(settings.recheck_before_delivery)
    }
}
