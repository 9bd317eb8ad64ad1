//! The host adapter mounted just above the page tree.

use crate::bridge::HostBridge;
use crate::signal::{HostOptions, HostSignal, HostView};
use miniapp_detect::EnvironmentVerdict;
use miniapp_events::{
    event_names, EventBusRef, HostReadyEvent, ThemeChangedEvent, ViewportChangedEvent,
};
use miniapp_session::UserContext;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Bridges host lifecycle signals into the app and owns the host-ready gate.
///
/// Under a simulated host the gate opens immediately with default values.
/// Under a real host a listener task applies signals until the wrapper is
/// unmounted or dropped.
pub struct AppWrapper {
    verdict: EnvironmentVerdict,
    view: Arc<watch::Sender<HostView>>,
    cancel_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// Everything the listener task needs.
struct Listener {
    verdict: EnvironmentVerdict,
    view: Arc<watch::Sender<HostView>>,
    user: Arc<UserContext>,
    bus: EventBusRef,
}

impl AppWrapper {
    /// Mount the adapter. Must run inside a tokio runtime when the verdict
    /// is [`EnvironmentVerdict::RealHost`].
    pub fn mount(
        verdict: EnvironmentVerdict,
        bridge: Option<Arc<dyn HostBridge>>,
        options: HostOptions,
        user: Arc<UserContext>,
        bus: EventBusRef,
    ) -> Self {
        let bridge = match (verdict, bridge) {
            (EnvironmentVerdict::RealHost, Some(bridge)) => bridge,
            (EnvironmentVerdict::RealHost, None) => {
                tracing::warn!("real host detected but no host bridge injected, assuming ready");
                return Self::assumed(verdict, options, &user, &bus);
            }
            (EnvironmentVerdict::SimulatedHost, _) => {
                return Self::assumed(verdict, options, &user, &bus);
            }
        };

        // Subscribe before returning so no signal raised after mount is lost.
        let rx = bridge.subscribe();
        let initial = HostView::waiting(
            bridge.initial_viewport().unwrap_or(options.viewport),
            bridge.initial_theme().unwrap_or_else(|| options.theme.clone()),
        );
        let (view, _) = watch::channel(initial);
        let view = Arc::new(view);

        let cancel_token = CancellationToken::new();
        let listener = Listener {
            verdict,
            view: Arc::clone(&view),
            user,
            bus,
        };
        let task = tokio::spawn(listener.run(rx, cancel_token.child_token(), options));

        Self {
            verdict,
            view,
            cancel_token,
            task: Some(task),
        }
    }

    fn assumed(
        verdict: EnvironmentVerdict,
        options: HostOptions,
        user: &UserContext,
        bus: &EventBusRef,
    ) -> Self {
        let (view, _) = watch::channel(HostView::assumed(options.viewport, options.theme));
        emit(
            bus,
            event_names::HOST_READY,
            &HostReadyEvent {
                verdict,
                fallback: true,
                user_id: user.user_id(),
                timestamp_ms: now_ms(),
            },
        );
        tracing::debug!(%verdict, "host ready with default viewport and theme");

        Self {
            verdict,
            view: Arc::new(view),
            cancel_token: CancellationToken::new(),
            task: None,
        }
    }

    pub fn verdict(&self) -> EnvironmentVerdict {
        self.verdict
    }

    pub fn is_host_ready(&self) -> bool {
        self.view.borrow().ready
    }

    pub fn host_view(&self) -> HostView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HostView> {
        self.view.subscribe()
    }

    /// Whether a listener task is still attached to the host.
    pub fn is_listening(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait for the host-ready gate to open.
    pub async fn wait_ready(&self) -> HostView {
        let mut rx = self.view.subscribe();
        loop {
            {
                let view = rx.borrow_and_update();
                if view.ready {
                    return view.clone();
                }
            }
            if rx.changed().await.is_err() {
                return self.host_view();
            }
        }
    }

    /// Release the host subscription and wait for the listener to exit.
    pub async fn unmount(&mut self) {
        self.cancel_token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "host listener task failed");
            }
        }
    }
}

impl Drop for AppWrapper {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

impl Listener {
    async fn run(
        self,
        mut rx: broadcast::Receiver<HostSignal>,
        cancel_token: CancellationToken,
        options: HostOptions,
    ) {
        tracing::info!("host listener started");
        let deadline = options
            .ready_timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);

        loop {
            let waiting = !self.view.borrow().ready;
            let ready_deadline = async {
                match (deadline, waiting) {
                    (Some(deadline), true) => tokio::time::sleep_until(deadline).await,
                    _ => std::future::pending::<()>().await,
                }
            };

            let signal = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    tracing::info!("host listener cancelled");
                    break;
                }
                _ = ready_deadline => {
                    let waited = options.ready_timeout.unwrap_or(Duration::ZERO);
                    tracing::warn!(?waited, "host did not report ready in time, assuming ready");
                    self.mark_ready(true);
                    continue;
                }
                signal = rx.recv() => signal,
            };

            match signal {
                Ok(signal) => self.apply(signal),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "host listener lagged behind");
                    // A dropped signal may have been the ready handshake.
                    if !self.view.borrow().ready {
                        tracing::warn!("signals lost before ready, assuming ready");
                        self.mark_ready(true);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    if !self.view.borrow().ready {
                        tracing::warn!("host bridge closed before ready, assuming ready");
                        self.mark_ready(true);
                    }
                    tracing::info!("host bridge closed");
                    break;
                }
            }
        }

        tracing::info!("host listener stopped");
    }

    fn apply(&self, signal: HostSignal) {
        match signal {
            HostSignal::Ready => self.mark_ready(false),
            HostSignal::ViewportChanged(viewport) => {
                let changed = self.view.send_if_modified(|view| {
                    if view.viewport == viewport {
                        return false;
                    }
                    view.viewport = viewport;
                    true
                });
                if changed {
                    emit(
                        &self.bus,
                        event_names::HOST_VIEWPORT_CHANGED,
                        &ViewportChangedEvent {
                            viewport,
                            user_id: self.user.user_id(),
                            timestamp_ms: now_ms(),
                        },
                    );
                }
            }
            HostSignal::ThemeChanged(theme) => {
                let changed = self.view.send_if_modified(|view| {
                    if view.theme == theme {
                        return false;
                    }
                    view.theme = theme.clone();
                    true
                });
                if changed {
                    tracing::debug!(color_scheme = %theme.color_scheme, "host theme changed");
                    emit(
                        &self.bus,
                        event_names::HOST_THEME_CHANGED,
                        &ThemeChangedEvent {
                            theme,
                            user_id: self.user.user_id(),
                            timestamp_ms: now_ms(),
                        },
                    );
                }
            }
        }
    }

    fn mark_ready(&self, assumed: bool) {
        let opened = self.view.send_if_modified(|view| {
            if view.ready {
                return false;
            }
            view.ready = true;
            view.assumed_ready = assumed;
            true
        });
        if !opened {
            return;
        }

        tracing::info!(assumed, "host ready");
        emit(
            &self.bus,
            event_names::HOST_READY,
            &HostReadyEvent {
                verdict: self.verdict,
                fallback: assumed,
                user_id: self.user.user_id(),
                timestamp_ms: now_ms(),
            },
        );
    }
}

fn emit<T: Serialize>(bus: &EventBusRef, topic: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => bus.emit(topic, value),
        Err(e) => tracing::warn!(topic, error = %e, "failed to serialize host event"),
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
