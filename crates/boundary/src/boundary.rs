//! The boundary state machine.

use crate::error::RenderError;
use crate::view::{FallbackView, View, FALLBACK_TITLE};
use std::panic::{self, AssertUnwindSafe};

/// Builds the view shown after a failure. Must not fail itself; a panicking
/// renderer is replaced by [`DefaultFallback`].
pub trait FallbackRenderer: Send + Sync {
    fn render_fallback(&self, error: &RenderError) -> View;
}

/// Generic heading plus the error's text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFallback;

impl FallbackRenderer for DefaultFallback {
    fn render_fallback(&self, error: &RenderError) -> View {
        View::Fallback(FallbackView {
            title: FALLBACK_TITLE.to_string(),
            message: error.display_text(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryState {
    Healthy,
    /// Terminal for this mount.
    Failed(RenderError),
}

/// Result of one guarded pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryOutput {
    pub view: View,
    /// Set only on the pass that moved the boundary to `Failed`.
    pub tripped: Option<RenderError>,
}

pub struct ErrorBoundary {
    state: BoundaryState,
    fallback: Box<dyn FallbackRenderer>,
}

impl Default for ErrorBoundary {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorBoundary")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::with_fallback(DefaultFallback)
    }

    pub fn with_fallback<F>(fallback: F) -> Self
    where
        F: FallbackRenderer + 'static,
    {
        Self {
            state: BoundaryState::Healthy,
            fallback: Box::new(fallback),
        }
    }

    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, BoundaryState::Failed(_))
    }

    pub fn error(&self) -> Option<&RenderError> {
        match &self.state {
            BoundaryState::Failed(error) => Some(error),
            BoundaryState::Healthy => None,
        }
    }

    /// Run one render pass of the wrapped subtree.
    ///
    /// Once failed, `render` is not called again and the fallback is returned.
    pub fn render<F>(&mut self, render: F) -> BoundaryOutput
    where
        F: FnOnce() -> Result<View, RenderError>,
    {
        if let BoundaryState::Failed(error) = &self.state {
            return BoundaryOutput {
                view: self.render_fallback(error),
                tripped: None,
            };
        }

        let result = match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(result) => result,
            Err(payload) => Err(RenderError::from_panic(payload.as_ref())),
        };

        match result {
            Ok(view) => BoundaryOutput {
                view,
                tripped: None,
            },
            Err(error) => {
                let view = self.render_fallback(&error);
                self.state = BoundaryState::Failed(error.clone());
                BoundaryOutput {
                    view,
                    tripped: Some(error),
                }
            }
        }
    }

    /// Fallback view for `error`, falling back to [`DefaultFallback`] if the
    /// configured renderer panics.
    pub fn render_fallback(&self, error: &RenderError) -> View {
        panic::catch_unwind(AssertUnwindSafe(|| self.fallback.render_fallback(error)))
            .unwrap_or_else(|_| DefaultFallback.render_fallback(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    fn ok_view() -> Result<View, RenderError> {
        Ok(View::page("Home", json!({"items": 3})))
    }

    #[test]
    fn test_healthy_pass_returns_view() {
        let mut boundary = ErrorBoundary::new();
        let output = boundary.render(ok_view);

        assert_eq!(output.view, View::page("Home", json!({"items": 3})));
        assert!(output.tripped.is_none());
        assert!(!boundary.is_failed());
    }

    #[test]
    fn test_string_error_shows_verbatim() {
        let mut boundary = ErrorBoundary::new();
        let output = boundary.render(|| Err("boom".into()));

        match output.view {
            View::Fallback(fallback) => assert_eq!(fallback.message, "boom"),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_structured_error_shows_message() {
        let mut boundary = ErrorBoundary::new();
        let output = boundary.render(|| Err(RenderError::message("x")));
        assert!(output.view.contains_text("x"));
        assert_eq!(output.tripped, Some(RenderError::message("x")));
    }

    #[test]
    fn test_object_error_shows_serialization() {
        let mut boundary = ErrorBoundary::new();
        let output = boundary.render(|| Err(json!({"status": 500}).into()));
        assert!(output.view.contains_text("status"));
    }

    #[test]
    fn test_panic_during_render_is_contained() {
        let mut boundary = ErrorBoundary::new();
        let output = boundary.render(|| panic!("render exploded"));

        assert!(boundary.is_failed());
        assert!(output.view.contains_text("render exploded"));
    }

    #[test]
    fn test_failed_is_terminal_and_trips_once() {
        let mut boundary = ErrorBoundary::new();
        let first = boundary.render(|| Err("first".into()));
        assert!(first.tripped.is_some());

        let calls = Cell::new(0);
        let second = boundary.render(|| {
            calls.set(calls.get() + 1);
            ok_view()
        });

        assert_eq!(calls.get(), 0, "subtree must not render again");
        assert!(second.tripped.is_none());
        assert!(second.view.contains_text("first"));
        assert_eq!(boundary.error(), Some(&RenderError::from("first")));
    }

    struct PanickingFallback;

    impl FallbackRenderer for PanickingFallback {
        fn render_fallback(&self, _error: &RenderError) -> View {
            panic!("fallback broke too");
        }
    }

    #[test]
    fn test_panicking_fallback_uses_default() {
        let mut boundary = ErrorBoundary::with_fallback(PanickingFallback);
        let output = boundary.render(|| Err("boom".into()));

        match output.view {
            View::Fallback(fallback) => {
                assert_eq!(fallback.title, FALLBACK_TITLE);
                assert_eq!(fallback.message, "boom");
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }
}
