//! User session context for the mini app.
//!
//! Resolves who the user is from the host's launch parameters, or
//! synthesizes a placeholder identity when there is no real host, and shares
//! the result with every component through [`UserContext`].
//!
//! # Example
//!
//! ```ignore
//! use miniapp_session::{LaunchParamsResolver, UserContext};
//! use miniapp_detect::EnvironmentVerdict;
//!
//! let ctx = UserContext::default();
//! let user = ctx
//!     .initialize(EnvironmentVerdict::SimulatedHost, None, &LaunchParamsResolver::new())
//!     .await;
//! assert!(user.is_placeholder());
//! ```

mod context;
mod error;
mod identity;
mod launch;
mod resolver;

pub use context::{SessionState, UserContext};
pub use error::{LaunchError, Result, SessionError};
pub use identity::{IdentitySource, PlaceholderIdentity, UserId, UserIdentity, DEFAULT_PLACEHOLDER_ID};
pub use launch::{build_signed_init_data, sign_data_check_string, LaunchParams, LaunchUser};
pub use resolver::{IdentityResolver, LaunchParamsResolver};
