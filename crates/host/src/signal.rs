//! Host lifecycle signals and the state they drive.

use miniapp_events::{Theme, Viewport};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle signal raised by the host container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum HostSignal {
    Ready,
    ViewportChanged(Viewport),
    ThemeChanged(Theme),
}

/// What the page tree knows about the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostView {
    /// The host-ready gate.
    pub ready: bool,
    /// Readiness was assumed (simulated host or host setup failure).
    pub assumed_ready: bool,
    pub viewport: Viewport,
    pub theme: Theme,
}

impl HostView {
    pub(crate) fn waiting(viewport: Viewport, theme: Theme) -> Self {
        Self {
            ready: false,
            assumed_ready: false,
            viewport,
            theme,
        }
    }

    pub(crate) fn assumed(viewport: Viewport, theme: Theme) -> Self {
        Self {
            ready: true,
            assumed_ready: true,
            viewport,
            theme,
        }
    }
}

/// Defaults used when the host cannot provide values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostOptions {
    pub viewport: Viewport,
    pub theme: Theme,
    /// Give up waiting for a real host's ready signal after this long.
    /// `None` waits indefinitely.
    pub ready_timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniapp_events::ColorScheme;

    #[test]
    fn test_signal_wire_format() {
        let signal = HostSignal::ThemeChanged(Theme {
            color_scheme: ColorScheme::Dark,
            params: Default::default(),
        });
        let value = serde_json::to_value(&signal).unwrap();
        assert_eq!(value["event"], "theme_changed");
        assert_eq!(value["payload"]["color_scheme"], "dark");

        let ready: HostSignal = serde_json::from_str(r#"{"event": "ready"}"#).unwrap();
        assert_eq!(ready, HostSignal::Ready);
    }
}
