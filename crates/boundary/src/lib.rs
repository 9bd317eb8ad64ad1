//! Render guard for the mini app.
//!
//! Wraps a synchronous render step. The first failure (an `Err` from the
//! step or a panic unwinding out of it) flips the boundary into a terminal
//! failed state and every later pass shows the fallback view instead.
//!
//! Errors raised by background tasks never pass through a render step and
//! are not seen here; the task that produced them owns their handling.
//!
//! ```
//! use miniapp_boundary::{ErrorBoundary, RenderError, View};
//!
//! let mut boundary = ErrorBoundary::new();
//! let output = boundary.render(|| Err(RenderError::from("boom")));
//!
//! assert!(boundary.is_failed());
//! assert!(output.view.contains_text("boom"));
//! ```

mod boundary;
mod error;
mod view;

pub use boundary::{BoundaryOutput, BoundaryState, DefaultFallback, ErrorBoundary, FallbackRenderer};
pub use error::RenderError;
pub use view::{FallbackView, PageView, View, FALLBACK_TITLE};
