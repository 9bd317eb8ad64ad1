//! Host adapter for the mini app.
//!
//! Turns the host container's lifecycle signals (ready, viewport, theme)
//! into a [`HostView`] the page tree can read, and exposes the single
//! host-ready gate the composition root waits on.
//!
//! # Architecture
//!
//! ```text
//! HostBridge (host SDK / ChannelHostBridge)
//!        │ broadcast::Receiver<HostSignal>
//!        ▼
//! AppWrapper ── listener task ──► watch<HostView> ──► page tree
//!                      │
//!                      └────────► EventBus (host:* events)
//! ```

mod bridge;
mod signal;
mod wrapper;

pub use bridge::{ChannelHostBridge, HostBridge, DEFAULT_SIGNAL_CAPACITY};
pub use signal::{HostOptions, HostSignal, HostView};
pub use wrapper::AppWrapper;
