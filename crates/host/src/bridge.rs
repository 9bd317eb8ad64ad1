//! Abstraction over the host SDK's event surface.

use crate::signal::HostSignal;
use miniapp_events::{Theme, Viewport};
use tokio::sync::broadcast;

/// Default capacity of [`ChannelHostBridge`].
pub const DEFAULT_SIGNAL_CAPACITY: usize = 32;

/// Source of host lifecycle signals.
///
/// The embedding layer implements this on top of the real host SDK; tests
/// and the dev binary use [`ChannelHostBridge`].
pub trait HostBridge: Send + Sync {
    /// Subscribe to signals raised from now on. Dropping the receiver
    /// releases the subscription.
    fn subscribe(&self) -> broadcast::Receiver<HostSignal>;

    /// Viewport known at subscription time, if any.
    fn initial_viewport(&self) -> Option<Viewport> {
        None
    }

    /// Theme known at subscription time, if any.
    fn initial_theme(&self) -> Option<Theme> {
        None
    }
}

/// In-process bridge backed by a broadcast channel.
pub struct ChannelHostBridge {
    tx: broadcast::Sender<HostSignal>,
    theme: Option<Theme>,
    viewport: Option<Viewport>,
}

impl Default for ChannelHostBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHostBridge {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SIGNAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            theme: None,
            viewport: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Raise a signal. Returns how many subscribers saw it.
    pub fn send(&self, signal: HostSignal) -> usize {
        self.tx.send(signal).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl HostBridge for ChannelHostBridge {
    fn subscribe(&self) -> broadcast::Receiver<HostSignal> {
        self.tx.subscribe()
    }

    fn initial_viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn initial_theme(&self) -> Option<Theme> {
        self.theme.clone()
    }
}
