//! Session state shared by every component that needs the current user.

use crate::error::SessionError;
use crate::identity::{PlaceholderIdentity, UserId, UserIdentity};
use crate::resolver::IdentityResolver;
use futures::FutureExt;
use miniapp_detect::EnvironmentVerdict;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use uuid::Uuid;

/// Snapshot of the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// Random id for this mount; not persisted.
    pub session_id: Uuid,
    pub user: Option<UserIdentity>,
    pub is_initialized: bool,
    /// Last resolution failure, kept after falling back to the placeholder.
    pub last_error: Option<SessionError>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user: None,
            is_initialized: false,
            last_error: None,
        }
    }
}

/// Process-wide user session.
///
/// Writes go through the methods on this type only; readers either borrow a
/// snapshot or [`subscribe`](Self::subscribe) to be notified of changes.
pub struct UserContext {
    state: watch::Sender<SessionState>,
    placeholder: PlaceholderIdentity,
    started: AtomicBool,
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new(PlaceholderIdentity::default())
    }
}

impl UserContext {
    pub fn new(placeholder: PlaceholderIdentity) -> Self {
        let (state, _) = watch::channel(SessionState::new());
        Self {
            state,
            placeholder,
            started: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.state.borrow().user.clone()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.state.borrow().user.as_ref().map(|u| u.id)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().is_initialized
    }

    pub fn last_error(&self) -> Option<SessionError> {
        self.state.borrow().last_error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn placeholder(&self) -> UserIdentity {
        self.placeholder.identity()
    }

    /// Resolve the session identity. Always completes.
    ///
    /// Under a real host the resolver turns `init_data` into an identity;
    /// under a simulated host, or when resolution fails, the placeholder
    /// identity is used. Only the first call does any work; later calls
    /// wait for that one and return its identity.
    pub async fn initialize(
        &self,
        verdict: EnvironmentVerdict,
        init_data: Option<&str>,
        resolver: &dyn IdentityResolver,
    ) -> UserIdentity {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("user context already initializing, ignoring repeated call");
            return self.wait_initialized().await;
        }

        let outcome = match (verdict, init_data) {
            (EnvironmentVerdict::RealHost, Some(init_data)) => {
                match AssertUnwindSafe(resolver.resolve(init_data)).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(payload) => Err(SessionError::Resolution(panic_message(payload.as_ref()))),
                }
            }
            (EnvironmentVerdict::RealHost, None) => Err(SessionError::MissingLaunchParams),
            (EnvironmentVerdict::SimulatedHost, _) => Ok(self.placeholder.identity()),
        };

        let (user, error) = match outcome {
            Ok(user) => (user, None),
            Err(error) => {
                tracing::warn!(%error, "identity resolution failed, using placeholder identity");
                (self.placeholder.identity(), Some(error))
            }
        };

        match self.settle(user, error, verdict) {
            Some(user) => user,
            // An explicit set_user won the race.
            None => self.wait_initialized().await,
        }
    }

    /// Settle on the placeholder identity without a resolver.
    ///
    /// Used under a simulated host, where no launch parameters exist and the
    /// identity is known at mount time. Returns `None` if initialization had
    /// already started.
    pub fn initialize_placeholder(&self) -> Option<UserIdentity> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("user context already initializing, ignoring placeholder init");
            return None;
        }
        self.settle(
            self.placeholder.identity(),
            None,
            EnvironmentVerdict::SimulatedHost,
        )
    }

    fn settle(
        &self,
        user: UserIdentity,
        error: Option<SessionError>,
        verdict: EnvironmentVerdict,
    ) -> Option<UserIdentity> {
        let applied = self.state.send_if_modified(|state| {
            if state.is_initialized {
                return false;
            }
            state.user = Some(user.clone());
            state.is_initialized = true;
            state.last_error = error;
            true
        });
        if !applied {
            return None;
        }

        tracing::info!(
            user_id = user.id,
            placeholder = user.is_placeholder(),
            %verdict,
            "user context initialized"
        );
        Some(user)
    }

    /// Wait until the context is initialized and return the current user.
    pub async fn wait_initialized(&self) -> UserIdentity {
        let mut rx = self.state.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                if state.is_initialized {
                    if let Some(user) = &state.user {
                        return user.clone();
                    }
                }
            }
            if rx.changed().await.is_err() {
                // Sender lives as long as `self`, so this is unreachable in practice.
                return self.placeholder.identity();
            }
        }
    }

    /// Replace the session identity.
    ///
    /// Counts as initialization if the context was not initialized yet.
    pub fn set_user(&self, user: UserIdentity) {
        self.started.store(true, Ordering::SeqCst);
        self.state.send_modify(|state| {
            state.user = Some(user);
            state.is_initialized = true;
            state.last_error = None;
        });
    }

    /// Drop the current identity in favour of the placeholder.
    ///
    /// The context stays initialized; consumers never see a missing user.
    pub fn clear_session(&self) {
        let placeholder = self.placeholder.identity();
        let cleared = self.state.send_if_modified(|state| {
            if !state.is_initialized {
                return false;
            }
            state.user = Some(placeholder);
            state.last_error = None;
            true
        });
        if !cleared {
            tracing::debug!("clear_session before initialization ignored");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("resolver panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("resolver panicked: {s}")
    } else {
        "resolver panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LaunchError;
    use crate::identity::IdentitySource;
    use crate::launch::build_signed_init_data;
    use crate::resolver::LaunchParamsResolver;
    use std::sync::Arc;

    fn real_init_data() -> String {
        build_signed_init_data(
            &[("user", r#"{"id":99,"first_name":"Linus"}"#), ("auth_date", "1700000000")],
            "1:token",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_starts_uninitialized() {
        let ctx = UserContext::default();
        assert!(!ctx.is_initialized());
        assert!(ctx.current_user().is_none());
    }

    #[tokio::test]
    async fn test_simulated_host_uses_placeholder() {
        let ctx = UserContext::default();
        let user = ctx
            .initialize(EnvironmentVerdict::SimulatedHost, None, &LaunchParamsResolver::new())
            .await;

        assert!(ctx.is_initialized());
        assert!(user.is_placeholder());
        assert_eq!(ctx.current_user(), Some(user));
        assert!(ctx.last_error().is_none());
    }

    #[tokio::test]
    async fn test_real_host_resolves_identity() {
        let ctx = UserContext::default();
        let data = real_init_data();
        let user = ctx
            .initialize(EnvironmentVerdict::RealHost, Some(&data), &LaunchParamsResolver::new())
            .await;

        assert_eq!(user.id, 99);
        assert_eq!(user.source, IdentitySource::Host);
    }

    #[tokio::test]
    async fn test_malformed_launch_falls_back_to_placeholder() {
        let ctx = UserContext::default();
        let user = ctx
            .initialize(
                EnvironmentVerdict::RealHost,
                Some("user=%7Bbroken"),
                &LaunchParamsResolver::new(),
            )
            .await;

        assert!(ctx.is_initialized());
        assert!(user.is_placeholder());
        assert!(matches!(
            ctx.last_error(),
            Some(SessionError::Launch(LaunchError::MalformedUser(_)))
        ));
    }

    #[tokio::test]
    async fn test_initialized_flips_exactly_once() {
        let ctx = UserContext::default();
        let mut rx = ctx.subscribe();
        assert!(!rx.borrow_and_update().is_initialized);

        ctx.initialize(EnvironmentVerdict::SimulatedHost, None, &LaunchParamsResolver::new())
            .await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_initialized);

        // A second call changes nothing and does not notify.
        let data = real_init_data();
        let again = ctx
            .initialize(EnvironmentVerdict::RealHost, Some(&data), &LaunchParamsResolver::new())
            .await;
        assert!(again.is_placeholder());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_wait_initialized_wakes_readers() {
        let ctx = Arc::new(UserContext::default());
        let reader = {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { ctx.wait_initialized().await })
        };

        ctx.initialize(EnvironmentVerdict::SimulatedHost, None, &LaunchParamsResolver::new())
            .await;
        let seen = reader.await.unwrap();
        assert!(seen.is_placeholder());
    }

    struct PanickingResolver;

    #[async_trait::async_trait]
    impl IdentityResolver for PanickingResolver {
        async fn resolve(&self, _init_data: &str) -> crate::error::Result<UserIdentity> {
            panic!("backend exploded")
        }
    }

    #[tokio::test]
    async fn test_panicking_resolver_still_initializes() {
        let ctx = UserContext::default();
        let user = ctx
            .initialize(EnvironmentVerdict::RealHost, Some("user=x"), &PanickingResolver)
            .await;

        assert!(ctx.is_initialized());
        assert!(user.is_placeholder());
        match ctx.last_error() {
            Some(SessionError::Resolution(message)) => assert!(message.contains("backend exploded")),
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_initialize_placeholder_is_synchronous_and_once() {
        let ctx = UserContext::default();
        let user = ctx.initialize_placeholder().unwrap();
        assert!(user.is_placeholder());
        assert!(ctx.is_initialized());
        assert_eq!(ctx.user_id(), Some(user.id));

        assert!(ctx.initialize_placeholder().is_none());
        let again = ctx
            .initialize(EnvironmentVerdict::RealHost, Some("user=x"), &PanickingResolver)
            .await;
        assert_eq!(again, user);
        assert!(ctx.last_error().is_none());
    }

    #[tokio::test]
    async fn test_set_and_clear_session() {
        let ctx = UserContext::default();
        ctx.clear_session();
        assert!(!ctx.is_initialized());

        let mut user = ctx.placeholder();
        user.id = 5;
        user.source = IdentitySource::Host;
        ctx.set_user(user.clone());
        assert!(ctx.is_initialized());
        assert_eq!(ctx.user_id(), Some(5));

        ctx.clear_session();
        assert!(ctx.is_initialized());
        assert!(ctx.current_user().unwrap().is_placeholder());
    }
}
