//! The seam between the composition root and page components.

use crate::connection::HostConnection;
use miniapp_boundary::{RenderError, View};
use miniapp_detect::EnvironmentVerdict;
use miniapp_host::HostView;
use miniapp_quiz::QuizDataContext;
use miniapp_session::UserIdentity;

/// Everything a page may read while rendering.
///
/// Only built once both the identity gate and the host-ready gate are open,
/// so `user` is never missing.
pub struct RenderContext<'a> {
    pub verdict: EnvironmentVerdict,
    pub user: &'a UserIdentity,
    pub quiz: &'a QuizDataContext,
    pub host: &'a HostView,
    pub connection: &'a HostConnection,
}

/// Root of the page tree.
pub trait Page: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> Result<View, RenderError>;
}

impl<F> Page for F
where
    F: Fn(&RenderContext<'_>) -> Result<View, RenderError> + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> Result<View, RenderError> {
        self(ctx)
    }
}
