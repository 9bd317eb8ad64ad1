//! Shared contracts for the mini app.
//!
//! DTOs that cross crate boundaries live here so the host adapter, the
//! contexts, the log endpoint and page components agree on field names:
//! - host lifecycle events (ready, viewport, theme)
//! - [`CalendarEvent`], the shape page components exchange with the backend
//! - [`LogEntry`], the body accepted by the log ingestion endpoint
//!
//! Also provides the [`EventBus`] trait for decoupled event emission.

mod bus;
mod calendar;
mod log;

pub use bus::{EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus, TracingEventBus};
pub use calendar::{CalendarEvent, CalendarEventType};
pub use log::{LogEntry, LogLevel};

use miniapp_detect::EnvironmentVerdict;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Viewport height used when the host never reports one.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;

/// Host color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Lenient parse; anything other than `dark` is light.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("dark") {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }
}

impl std::fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
        })
    }
}

/// Visible area reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub height: u32,
    /// Height once the host finished animating.
    pub stable_height: u32,
    pub is_expanded: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            height: DEFAULT_VIEWPORT_HEIGHT,
            stable_height: DEFAULT_VIEWPORT_HEIGHT,
            is_expanded: true,
        }
    }
}

/// Theme reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub color_scheme: ColorScheme,
    /// Host palette, e.g. `bg_color -> #ffffff`.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Emitted once the host (real or simulated) reports readiness.
///
/// Producers: host adapter
/// Consumers: analytics, dev console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostReadyEvent {
    pub verdict: EnvironmentVerdict,
    /// `true` when readiness was assumed rather than signalled by the host.
    #[serde(default)]
    pub fallback: bool,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub timestamp_ms: i64,
}

/// Emitted when the host viewport changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportChangedEvent {
    pub viewport: Viewport,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub timestamp_ms: i64,
}

/// Emitted when the host theme changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeChangedEvent {
    pub theme: Theme,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub timestamp_ms: i64,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const HOST_READY: &str = "host:ready";
    pub const HOST_VIEWPORT_CHANGED: &str = "host:viewport_changed";
    pub const HOST_THEME_CHANGED: &str = "host:theme_changed";
}
