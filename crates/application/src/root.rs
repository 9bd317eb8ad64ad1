//! Composition root.
//!
//! Mounts the providers in dependency order:
//!
//! ```text
//! ErrorBoundary
//!   └─ HostConnection (manifest URL)
//!        └─ UserContext
//!             └─ QuizDataContext
//!                  └─ AppWrapper
//!                       └─ page tree
//! ```
//!
//! Detection runs once, synchronously, before the host adapter is built.
//! Under a real host, identity resolution runs as a spawned task so
//! mounting never blocks; a simulated host settles on the placeholder
//! identity before the host adapter mounts.

use crate::config::AppConfig;
use crate::connection::HostConnection;
use crate::error::{AppError, Result};
use crate::page::{Page, RenderContext};
use miniapp_boundary::{BoundaryState, ErrorBoundary, RenderError, View};
use miniapp_detect::{classify, Detection, EnvironmentVerdict, HostObject};
use miniapp_events::{EventBusRef, LogEntry, TracingEventBus};
use miniapp_host::{AppWrapper, HostBridge, HostView};
use miniapp_logging::{HttpLogSink, LogSinkRef, TracingLogSink};
use miniapp_quiz::QuizDataContext;
use miniapp_session::{IdentityResolver, UserContext, UserIdentity};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What the embedding layer knows about the host at mount time.
#[derive(Clone, Default)]
pub struct HostEnvironment {
    /// The host SDK object, if one was injected.
    pub object: Option<HostObject>,
    /// Signal source for a real host.
    pub bridge: Option<Arc<dyn HostBridge>>,
}

impl HostEnvironment {
    /// No host object at all, as in a plain browser.
    pub fn simulated() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, object: HostObject) -> Self {
        self.object = Some(object);
        self
    }

    /// Read the host object from an arbitrarily shaped JSON snapshot.
    pub fn with_object_value(mut self, value: &serde_json::Value) -> Self {
        self.object = HostObject::from_value(value);
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn HostBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }
}

/// Collaborators injected into the root.
#[derive(Clone)]
pub struct Services {
    pub bus: EventBusRef,
    pub log_sink: LogSinkRef,
    pub resolver: Arc<dyn IdentityResolver>,
}

impl Services {
    /// Tracing event bus, the configured log endpoint (local tracing when
    /// unset), and a launch-parameter resolver built from `[launch]`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let log_sink: LogSinkRef = match config.log_endpoint()? {
            Some(endpoint) => Arc::new(HttpLogSink::new(endpoint)),
            None => Arc::new(TracingLogSink),
        };

        Ok(Self {
            bus: Arc::new(TracingEventBus),
            log_sink,
            resolver: Arc::new(config.resolver()),
        })
    }

    pub fn with_bus(mut self, bus: EventBusRef) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_log_sink(mut self, log_sink: LogSinkRef) -> Self {
        self.log_sink = log_sink;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn IdentityResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

pub struct Root {
    boundary: ErrorBoundary,
    connection: HostConnection,
    detection: Detection,
    user: Arc<UserContext>,
    quiz: Arc<QuizDataContext>,
    host: AppWrapper,
    page: Box<dyn Page>,
    log_sink: LogSinkRef,
    init_task: Option<JoinHandle<UserIdentity>>,
}

impl Root {
    /// Mount the provider tree. Must be called inside a tokio runtime.
    pub fn mount<P>(
        config: &AppConfig,
        env: HostEnvironment,
        page: P,
        services: Services,
    ) -> Result<Self>
    where
        P: Page + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| AppError::NoRuntime)?;
        config.validate()?;

        let boundary = ErrorBoundary::new();
        let connection = HostConnection::new(config.manifest_url()?);

        let detection = classify(env.object.as_ref());
        let verdict = detection.verdict;

        let user = Arc::new(UserContext::new(config.placeholder.clone()));
        // Settled before AppWrapper mounts so host:ready carries the user.
        let init_task = match verdict {
            EnvironmentVerdict::SimulatedHost => {
                user.initialize_placeholder();
                None
            }
            EnvironmentVerdict::RealHost => {
                let user = Arc::clone(&user);
                let resolver = Arc::clone(&services.resolver);
                let init_data = detection.init_data().map(str::to_owned);
                Some(runtime.spawn(async move {
                    user.initialize(verdict, init_data.as_deref(), resolver.as_ref())
                        .await
                }))
            }
        };

        let quiz = Arc::new(QuizDataContext::new(Arc::clone(&user)));

        let host = AppWrapper::mount(
            verdict,
            env.bridge,
            config.host_options(),
            Arc::clone(&user),
            services.bus,
        );

        tracing::info!(%verdict, manifest_url = %connection.manifest_url(), "root mounted");

        Ok(Self {
            boundary,
            connection,
            detection,
            user,
            quiz,
            host,
            page: Box::new(page),
            log_sink: services.log_sink,
            init_task,
        })
    }

    /// Run one guarded render pass.
    ///
    /// Returns [`View::Pending`] until the user is initialized and the host
    /// is ready. A failure is reported to the log sink on the pass that
    /// trips the boundary; every later pass shows the fallback.
    pub fn render(&mut self) -> View {
        let session = self.user.state();
        let host_view = self.host.host_view();
        let verdict = self.detection.verdict;
        let page = self.page.as_ref();
        let quiz = self.quiz.as_ref();
        let connection = &self.connection;

        let output = self.boundary.render(|| {
            let user = match (&session.user, session.is_initialized) {
                (Some(user), true) => user,
                _ => return Ok(View::Pending),
            };
            if !host_view.ready {
                return Ok(View::Pending);
            }

            let ctx = RenderContext {
                verdict,
                user,
                quiz,
                host: &host_view,
                connection,
            };
            page.render(&ctx)
        });

        if let Some(error) = output.tripped {
            self.report(&error);
        }
        output.view
    }

    fn report(&self, error: &RenderError) {
        let message = error.display_text();
        tracing::error!(error = %message, "page tree failed, showing fallback");

        let entry = LogEntry::error(message)
            .with_user(self.user.user_id())
            .with_data(json!({
                "source": "error_boundary",
                "error": error,
                "verdict": self.detection.verdict,
            }));
        self.log_sink.send(entry);
    }

    /// Wait until both gates are open.
    pub async fn wait_until_ready(&self) -> (UserIdentity, HostView) {
        tokio::join!(self.user.wait_initialized(), self.host.wait_ready())
    }

    pub fn is_ready(&self) -> bool {
        self.user.is_initialized() && self.host.is_host_ready()
    }

    pub fn verdict(&self) -> EnvironmentVerdict {
        self.detection.verdict
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    pub fn connection(&self) -> &HostConnection {
        &self.connection
    }

    pub fn user(&self) -> &Arc<UserContext> {
        &self.user
    }

    pub fn quiz(&self) -> &Arc<QuizDataContext> {
        &self.quiz
    }

    pub fn host(&self) -> &AppWrapper {
        &self.host
    }

    pub fn boundary_state(&self) -> &BoundaryState {
        self.boundary.state()
    }

    /// Tear down in reverse mount order.
    pub async fn unmount(&mut self) {
        self.host.unmount().await;
        if let Some(task) = self.init_task.take() {
            task.abort();
        }
        tracing::debug!("root unmounted");
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        if let Some(task) = self.init_task.take() {
            task.abort();
        }
    }
}
